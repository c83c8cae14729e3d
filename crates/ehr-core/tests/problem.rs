mod common;

use std::cell::Cell;

use chrono::NaiveDateTime;
use polars::prelude::AnyValue;

use ehr_core::datetime::parse_instant;
use ehr_core::problems::{
    DURATION_TABLE, DiagnosisPrediction, LengthOfStay, Mortality, ProlongedLengthOfStay,
    Readmission,
};
use ehr_core::{
    CoreError, EntityGraph, LabelStatus, ProblemDefinition, Result, SchemaError,
    generate_cutoff_times, label_status,
};
use ehr_model::{LabelValue, PredictionType, ProblemConfig, RelationshipEdge};

use common::{build, fhir_frames, fhir_graph, frame, some};

fn at(value: &str) -> NaiveDateTime {
    parse_instant(value).expect("instant")
}

fn labels(table: &ehr_core::CutoffTable) -> Vec<(String, NaiveDateTime, LabelValue)> {
    table
        .records
        .iter()
        .map(|record| (record.instance_id.clone(), record.cutoff_time, record.label))
        .collect()
}

/// A problem whose generator only counts how often it runs.
struct Counting {
    config: ProblemConfig,
    calls: Cell<usize>,
}

impl Counting {
    fn new(config: ProblemConfig) -> Self {
        Self {
            config,
            calls: Cell::new(0),
        }
    }
}

impl ProblemDefinition for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn config(&self) -> &ProblemConfig {
        &self.config
    }

    fn generate_label(&self, _graph: &mut EntityGraph) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

#[test]
fn length_of_stay_generates_label_and_duration_table() {
    let mut graph = fhir_graph();
    let problem = LengthOfStay::new();
    assert_eq!(
        label_status(&graph, problem.config()),
        LabelStatus::MissingColumn
    );

    let table = generate_cutoff_times(&problem, &mut graph).expect("cutoffs");

    assert_eq!(
        labels(&table),
        vec![
            ("e1".to_string(), at("2018-09-20T00:00"), LabelValue::Int(0)),
            ("e2".to_string(), at("2018-09-20T00:00"), LabelValue::Int(0)),
            ("e3".to_string(), at("2018-09-27T11:23"), LabelValue::Int(0)),
            ("e4".to_string(), at("2018-10-10T08:00"), LabelValue::Int(4)),
        ]
    );
    assert_eq!(table.gaps, 0);

    let encounter = graph.table("Encounter").expect("encounter");
    assert_eq!(encounter.any_value("length", 3), AnyValue::Int64(4));
    let duration = graph.table(DURATION_TABLE).expect("duration table");
    assert_eq!(duration.height(), 2);
    assert!(graph.has_edge(&RelationshipEdge::new(
        DURATION_TABLE,
        "object_id",
        "Encounter",
        "length"
    )));
    assert!(label_status(&graph, problem.config()).is_ready());

    let frame = table.to_frame().expect("frame");
    assert_eq!(frame.width(), 3);
    assert_eq!(frame.height(), 4);
}

#[test]
fn existing_label_is_used_as_is() {
    let mut frames = fhir_frames();
    frames.retain(|(name, _)| name != "Encounter");
    frames.push((
        "Encounter".to_string(),
        frame(vec![
            ("identifier", some(&["e1", "e2", "e3", "e4"])),
            ("period", some(&["per1", "per2", "per3", "per4"])),
            ("length", some(&["9", "8", "7", "6"])),
        ]),
    ));
    let mut graph = build(frames);

    let table = generate_cutoff_times(&LengthOfStay::new(), &mut graph).expect("cutoffs");
    let values: Vec<LabelValue> = table.records.iter().map(|record| record.label).collect();
    assert_eq!(
        values,
        vec![
            LabelValue::Int(9),
            LabelValue::Int(8),
            LabelValue::Int(7),
            LabelValue::Int(6)
        ]
    );
    assert!(graph.table(DURATION_TABLE).is_none());
}

#[test]
fn sentinel_labels_are_regenerated() {
    let mut frames = fhir_frames();
    frames.retain(|(name, _)| name != "Encounter");
    frames.push((
        "Encounter".to_string(),
        frame(vec![
            ("identifier", some(&["e1", "e2", "e3", "e4"])),
            ("period", some(&["per1", "per2", "per3", "per4"])),
            ("length", some(&["1", "unknown", "NaN", "2"])),
        ]),
    ));
    let mut graph = build(frames);
    let problem = LengthOfStay::new();
    assert_eq!(
        label_status(&graph, problem.config()),
        LabelStatus::Incomplete { missing: 2 }
    );

    let table = generate_cutoff_times(&problem, &mut graph).expect("cutoffs");
    assert_eq!(table.records[3].label, LabelValue::Int(4));
}

#[test]
fn prolonged_stay_uses_threshold() {
    let mut graph = fhir_graph();
    let table =
        generate_cutoff_times(&ProlongedLengthOfStay::new(3), &mut graph).expect("cutoffs");
    let values: Vec<LabelValue> = table.records.iter().map(|record| record.label).collect();
    assert_eq!(
        values,
        vec![
            LabelValue::Bool(false),
            LabelValue::Bool(false),
            LabelValue::Bool(false),
            LabelValue::Bool(true)
        ]
    );
    assert_eq!(ProlongedLengthOfStay::default().threshold_days(), 7);
}

#[test]
fn readmission_cuts_off_at_discharge() {
    let mut graph = fhir_graph();
    let table = generate_cutoff_times(&Readmission::default(), &mut graph).expect("cutoffs");
    assert_eq!(
        labels(&table),
        vec![
            ("e1".to_string(), at("2018-09-20T00:12"), LabelValue::Bool(true)),
            ("e2".to_string(), at("2018-09-20T00:12"), LabelValue::Bool(true)),
            ("e3".to_string(), at("2018-09-27T11:23"), LabelValue::Bool(false)),
            ("e4".to_string(), at("2018-10-14T09:00"), LabelValue::Bool(false)),
        ]
    );
}

#[test]
fn readmission_respects_window() {
    let mut graph = fhir_graph();
    let table = generate_cutoff_times(&Readmission::new(10), &mut graph).expect("cutoffs");
    assert!(
        table
            .records
            .iter()
            .all(|record| record.label == LabelValue::Bool(false))
    );
}

#[test]
fn mortality_and_diagnosis_follow_condition_codes() {
    let mut graph = fhir_graph();
    let mortality = generate_cutoff_times(&Mortality::default(), &mut graph).expect("mortality");
    let flags: Vec<LabelValue> = mortality.records.iter().map(|record| record.label).collect();
    assert_eq!(
        flags,
        vec![
            LabelValue::Bool(false),
            LabelValue::Bool(true),
            LabelValue::Bool(false),
            LabelValue::Bool(false)
        ]
    );

    let diagnosis =
        generate_cutoff_times(&DiagnosisPrediction::new("i10"), &mut graph).expect("diagnosis");
    let flags: Vec<LabelValue> = diagnosis.records.iter().map(|record| record.label).collect();
    assert_eq!(flags[3], LabelValue::Bool(true));
    assert_eq!(flags.iter().filter(|flag| **flag == LabelValue::Bool(true)).count(), 1);
}

#[test]
fn mortality_without_diagnoses_is_missing_label() {
    let mut frames = fhir_frames();
    frames.retain(|(name, _)| name != "Coding");
    let mut graph = build(frames);
    let err = generate_cutoff_times(&Mortality::default(), &mut graph).unwrap_err();
    assert!(matches!(err, CoreError::MissingLabel { column, .. } if column == "mortality"));
}

#[test]
fn missing_source_columns_are_fatal() {
    let mut frames = fhir_frames();
    frames.retain(|(name, _)| name != "Period");
    frames.push((
        "Period".to_string(),
        frame(vec![
            ("object_id", some(&["per1", "per2", "per3", "per4"])),
            ("start", some(&["2018-09-20", "2018-09-20", "2018-09-27", "2018-10-10"])),
        ]),
    ));
    let mut graph = build(frames);
    let err = generate_cutoff_times(&LengthOfStay::new(), &mut graph).unwrap_err();
    assert!(matches!(err, CoreError::MissingLabel { table, column, .. } if table == "Encounter" && column == "length"));
    assert!(!graph.contains(DURATION_TABLE));
}

#[test]
fn label_generation_runs_at_most_once() {
    let mut graph = fhir_graph();
    let problem = Counting::new(ProblemConfig::new(
        "Encounter",
        "outcome",
        "Period",
        "start",
        PredictionType::Classification,
    ));
    let err = generate_cutoff_times(&problem, &mut graph).unwrap_err();
    assert!(matches!(err, CoreError::MissingLabel { column, .. } if column == "outcome"));
    assert_eq!(problem.calls.get(), 1);
}

#[test]
fn missing_cutoff_column_is_fatal() {
    let mut graph = fhir_graph();
    let problem = Counting::new(ProblemConfig::new(
        "Encounter",
        "subject",
        "Period",
        "admitted",
        PredictionType::Classification,
    ));
    let err = generate_cutoff_times(&problem, &mut graph).unwrap_err();
    assert!(matches!(err, CoreError::MissingCutoff { table, column } if table == "Period" && column == "admitted"));
    assert_eq!(problem.calls.get(), 0);
}

#[test]
fn unlinked_cutoff_table_is_schema_error() {
    let mut graph = fhir_graph();
    graph
        .replace_table(
            "Window",
            frame(vec![
                ("identifier", some(&["w1"])),
                ("start", some(&["2018-09-20"])),
                ("end", some(&["2018-09-21"])),
            ]),
        )
        .expect("insert");
    graph
        .replace_table(
            "Encounter",
            frame(vec![
                ("identifier", some(&["e1", "e2", "e3", "e4"])),
                ("period", some(&["per1", "per2", "per3", "per4"])),
                ("flag", some(&["true", "false", "true", "false"])),
            ]),
        )
        .expect("replace");
    let problem = Counting::new(ProblemConfig::new(
        "Encounter",
        "flag",
        "Window",
        "start",
        PredictionType::Classification,
    ));
    let err = generate_cutoff_times(&problem, &mut graph).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Schema(SchemaError::NoRelationshipPath { from, to }) if from == "Encounter" && to == "Window"
    ));
}

#[test]
fn non_numeric_label_is_rejected() {
    let mut graph = fhir_graph();
    let problem = Counting::new(ProblemConfig::new(
        "Encounter",
        "subject",
        "Period",
        "start",
        PredictionType::Classification,
    ));
    let err = generate_cutoff_times(&problem, &mut graph).unwrap_err();
    assert!(matches!(err, CoreError::MissingLabel { column, .. } if column == "subject"));
}

#[test]
fn rows_without_cutoff_are_counted_as_gaps() {
    let mut frames = fhir_frames();
    frames.retain(|(name, _)| name != "Encounter");
    frames.push((
        "Encounter".to_string(),
        frame(vec![
            ("identifier", some(&["e1", "e2", "e5"])),
            ("period", vec![Some("per1"), Some("per2"), Some("per9")]),
            ("flag", some(&["1", "0", "1"])),
        ]),
    ));
    let mut graph = build(frames);
    let problem = Counting::new(ProblemConfig::new(
        "Encounter",
        "flag",
        "Period",
        "start",
        PredictionType::Classification,
    ));
    let table = generate_cutoff_times(&problem, &mut graph).expect("cutoffs");
    assert_eq!(table.len(), 2);
    assert_eq!(table.gaps, 1);
}
