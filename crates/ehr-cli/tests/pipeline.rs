//! End-to-end runs over a folder of CSV exports.

use std::fs;

use ehr_cli::config::RunConfig;
use ehr_cli::pipeline::{ProblemKind, build_problem, load_graph, run_problem};
use ehr_model::RecordTypeRegistry;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).expect("write file");
}

fn export() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "Patient.csv", "identifier\np1\np2\n");
    write(
        &dir,
        "Period.csv",
        "object_id,start,end\n\
         per1,2018-09-20T00:00,2018-09-20T00:12\n\
         per2,2018-09-20T00:00,2018-09-20T00:20\n\
         per3,2018-09-27T11:23,2018-09-27T11:23\n\
         per4,2018-10-10T08:00,2018-10-14T09:00\n",
    );
    write(
        &dir,
        "Encounter.csv",
        "identifier,subject,period\ne1,p1,per1\ne2,p1,per2\ne3,p2,per3\ne4,p1,per4\n",
    );
    write(&dir, "encounter_notes.csv", "text\nignored\n");
    dir
}

fn csv_output(kind: ProblemKind, config: &RunConfig) -> String {
    let dir = export();
    let registry = RecordTypeRegistry::fhir();
    let mut graph = load_graph(dir.path(), &registry).expect("graph");
    let problem = build_problem(kind, &config.problem, None).expect("problem");
    let table = run_problem(problem.as_ref(), &mut graph).expect("cutoffs");
    let mut out = Vec::new();
    table.write_csv(&mut out).expect("csv");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn graph_links_the_loaded_files() {
    let dir = export();
    let graph = load_graph(dir.path(), &RecordTypeRegistry::fhir()).expect("graph");
    let names: Vec<&str> = graph.table_names().collect();
    assert_eq!(names, vec!["Encounter", "Patient", "Period"]);
    assert_eq!(graph.edge_count(), 2);

    let summary = graph.summary();
    let json = serde_json::to_value(&summary).expect("json");
    assert_eq!(json["tables"].as_array().map(Vec::len), Some(3));
}

#[test]
fn length_of_stay_csv() {
    let csv = csv_output(ProblemKind::Los, &RunConfig::default());
    assert_eq!(
        csv,
        "instance_id,cutoff_time,label\n\
         e1,2018-09-20T00:00:00,0\n\
         e2,2018-09-20T00:00:00,0\n\
         e3,2018-09-27T11:23:00,0\n\
         e4,2018-10-10T08:00:00,4\n"
    );
}

#[test]
fn readmission_window_comes_from_config() {
    let default_window = csv_output(ProblemKind::Readmission, &RunConfig::default());
    assert!(default_window.contains("e1,2018-09-20T00:12:00,true\n"));

    let config = RunConfig::parse("[problem]\nreadmission_window_days = 10\n").expect("config");
    let short_window = csv_output(ProblemKind::Readmission, &config);
    assert!(short_window.lines().skip(1).all(|line| line.ends_with(",false")));
}

#[test]
fn empty_folder_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = load_graph(dir.path(), &RecordTypeRegistry::fhir()).unwrap_err();
    assert!(err.to_string().contains("no record files"));
}

#[test]
fn mortality_without_diagnoses_fails_with_context() {
    let dir = export();
    let mut graph = load_graph(dir.path(), &RecordTypeRegistry::fhir()).expect("graph");
    let problem =
        build_problem(ProblemKind::Mortality, &RunConfig::default().problem, None).expect("problem");
    let err = run_problem(problem.as_ref(), &mut graph).unwrap_err();
    assert!(format!("{err:#}").contains("mortality"));
}
