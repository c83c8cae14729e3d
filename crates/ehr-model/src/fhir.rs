//! FHIR-style record types and their relationship declarations.
//!
//! Each record type declares the edges in which it is the child. Resource
//! tables are keyed by `identifier`; datatype tables (Period,
//! CodeableConcept, Coding) are keyed by `object_id`.

use crate::record_type::{RecordType, RecordTypeRegistry, TemporalRole};

pub const PATIENT: &str = "Patient";
pub const ORGANIZATION: &str = "Organization";
pub const LOCATION: &str = "Location";
pub const PERIOD: &str = "Period";
pub const ENCOUNTER: &str = "Encounter";
pub const ENCOUNTER_DIAGNOSIS: &str = "Encounter_Diagnosis";
pub const CONDITION: &str = "Condition";
pub const CODEABLE_CONCEPT: &str = "CodeableConcept";
pub const CODING: &str = "Coding";
pub const OBSERVATION: &str = "Observation";
pub const PROCEDURE: &str = "Procedure";

const RESOURCE_KEY: &str = "identifier";
const DATATYPE_KEY: &str = "object_id";

fn patient() -> RecordType {
    RecordType::new(PATIENT).references("managingOrganization", ORGANIZATION, RESOURCE_KEY)
}

fn organization() -> RecordType {
    RecordType::new(ORGANIZATION).references("partOf", ORGANIZATION, RESOURCE_KEY)
}

fn location() -> RecordType {
    RecordType::new(LOCATION).references("managingOrganization", ORGANIZATION, RESOURCE_KEY)
}

fn period() -> RecordType {
    RecordType::new(PERIOD).with_temporal_role(TemporalRole::Period)
}

fn encounter() -> RecordType {
    RecordType::new(ENCOUNTER)
        .references("subject", PATIENT, RESOURCE_KEY)
        .references("period", PERIOD, DATATYPE_KEY)
        .references("serviceProvider", ORGANIZATION, RESOURCE_KEY)
        .references("location", LOCATION, RESOURCE_KEY)
        .references("reason", CODEABLE_CONCEPT, DATATYPE_KEY)
}

fn encounter_diagnosis() -> RecordType {
    RecordType::new(ENCOUNTER_DIAGNOSIS)
        .references("subject", ENCOUNTER, RESOURCE_KEY)
        .references("condition", CONDITION, RESOURCE_KEY)
}

fn condition() -> RecordType {
    RecordType::new(CONDITION)
        .references("subject", PATIENT, RESOURCE_KEY)
        .references("code", CODEABLE_CONCEPT, DATATYPE_KEY)
}

fn codeable_concept() -> RecordType {
    RecordType::new(CODEABLE_CONCEPT).references("coding", CODING, DATATYPE_KEY)
}

fn coding() -> RecordType {
    RecordType::new(CODING)
}

fn observation() -> RecordType {
    RecordType::new(OBSERVATION)
        .references("subject", PATIENT, RESOURCE_KEY)
        .references("context", ENCOUNTER, RESOURCE_KEY)
        .references("code", CODEABLE_CONCEPT, DATATYPE_KEY)
}

fn procedure() -> RecordType {
    RecordType::new(PROCEDURE)
        .references("subject", PATIENT, RESOURCE_KEY)
        .references("context", ENCOUNTER, RESOURCE_KEY)
        .references("code", CODEABLE_CONCEPT, DATATYPE_KEY)
}

impl RecordTypeRegistry {
    /// Registry of the FHIR record types understood by the loader.
    pub fn fhir() -> Self {
        let entries: [(&str, fn() -> RecordType); 11] = [
            (PATIENT, patient),
            (ORGANIZATION, organization),
            (LOCATION, location),
            (PERIOD, period),
            (ENCOUNTER, encounter),
            (ENCOUNTER_DIAGNOSIS, encounter_diagnosis),
            (CONDITION, condition),
            (CODEABLE_CONCEPT, codeable_concept),
            (CODING, coding),
            (OBSERVATION, observation),
            (PROCEDURE, procedure),
        ];
        let mut registry = Self::new();
        for (name, factory) in entries {
            let registered = registry.register(name, factory);
            debug_assert!(registered.is_ok(), "duplicate FHIR record type {name}");
        }
        registry
    }
}
