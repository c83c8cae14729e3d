//! Integration tests for loading a folder of record files.

use std::fs;

use ehr_ingest::{load_record_frames, read_csv_table};
use ehr_model::RecordTypeRegistry;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).expect("write file");
}

#[test]
fn loads_registered_files_only() {
    let dir = TempDir::new().expect("temp dir");
    write(
        &dir,
        "Encounter.csv",
        "identifier,subject,period\ne1,p1,per1\ne2,,per2\n",
    );
    write(
        &dir,
        "Period.csv",
        "object_id,start,end\nper1,2018-09-20T00:00,2018-09-21T00:00\nper2,2018-09-27T11:23,\n",
    );
    write(&dir, "Scratch.csv", "a,b\n1,2\n");
    write(&dir, "README.csv", "notes\nnothing\n");

    let mut frames = load_record_frames(dir.path(), &RecordTypeRegistry::fhir()).expect("load");
    frames.sort_by(|a, b| a.record_type.cmp(&b.record_type));

    let names: Vec<&str> = frames.iter().map(|f| f.record_type.as_str()).collect();
    assert_eq!(names, vec!["Encounter", "Period"]);

    let encounter = &frames[0].data;
    assert_eq!(encounter.height(), 2);
    assert_eq!(encounter.column("subject").expect("subject").null_count(), 1);

    let period = &frames[1].data;
    assert_eq!(period.column("end").expect("end").null_count(), 1);
}

#[test]
fn reads_table_with_blank_and_short_rows() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir, "Coding.csv", "\u{feff}object_id, code ,system\n\nc1,R99\nc2,I46.1,icd10\n");
    let table = read_csv_table(&dir.path().join("Coding.csv")).expect("read");

    assert_eq!(table.headers, vec!["object_id", "code", "system"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], vec!["c1", "R99", ""]);
    assert_eq!(table.column_index("system"), Some(2));
}
