#![allow(dead_code)]

use polars::prelude::{Column, DataFrame};

use ehr_core::{EntityGraph, EntityGraphBuilder};
use ehr_model::RecordTypeRegistry;

pub fn frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
    DataFrame::new(
        columns
            .into_iter()
            .map(|(name, values)| Column::new(name.into(), values))
            .collect(),
    )
    .expect("frame")
}

pub fn some<'a>(values: &[&'a str]) -> Vec<Option<&'a str>> {
    values.iter().map(|value| Some(*value)).collect()
}

pub fn patient() -> DataFrame {
    frame(vec![("identifier", some(&["p1", "p2"]))])
}

pub fn period() -> DataFrame {
    frame(vec![
        ("object_id", some(&["per1", "per2", "per3", "per4"])),
        (
            "start",
            some(&[
                "2018-09-20T00:00",
                "2018-09-20T00:00",
                "2018-09-27T11:23",
                "2018-10-10T08:00",
            ]),
        ),
        (
            "end",
            some(&[
                "2018-09-20T00:12",
                "2018-09-20T00:20",
                "2018-09-27T11:23",
                "2018-10-14T09:00",
            ]),
        ),
    ])
}

pub fn encounter() -> DataFrame {
    frame(vec![
        ("identifier", some(&["e1", "e2", "e3", "e4"])),
        ("subject", some(&["p1", "p1", "p2", "p1"])),
        ("period", some(&["per1", "per2", "per3", "per4"])),
    ])
}

pub fn encounter_diagnosis() -> DataFrame {
    frame(vec![
        ("identifier", some(&["d1", "d2"])),
        ("subject", some(&["e2", "e4"])),
        ("condition", some(&["c1", "c2"])),
    ])
}

pub fn condition() -> DataFrame {
    frame(vec![
        ("identifier", some(&["c1", "c2"])),
        ("subject", some(&["p1", "p1"])),
        ("code", some(&["cc1", "cc2"])),
    ])
}

pub fn codeable_concept() -> DataFrame {
    frame(vec![
        ("object_id", some(&["cc1", "cc2"])),
        ("coding", some(&["cod1", "cod2"])),
    ])
}

pub fn coding() -> DataFrame {
    frame(vec![
        ("object_id", some(&["cod1", "cod2"])),
        ("code", some(&["R99", "I10"])),
    ])
}

/// Every fixture frame, named the way loaded files would be.
pub fn fhir_frames() -> Vec<(String, DataFrame)> {
    vec![
        ("Patient".to_string(), patient()),
        ("Period".to_string(), period()),
        ("Encounter".to_string(), encounter()),
        ("Encounter_Diagnosis".to_string(), encounter_diagnosis()),
        ("Condition".to_string(), condition()),
        ("CodeableConcept".to_string(), codeable_concept()),
        ("Coding".to_string(), coding()),
    ]
}

pub fn build(frames: Vec<(String, DataFrame)>) -> EntityGraph {
    EntityGraphBuilder::from_registry(&RecordTypeRegistry::fhir(), frames)
        .expect("registered types")
        .build()
        .expect("graph")
}

pub fn fhir_graph() -> EntityGraph {
    build(fhir_frames())
}
