use std::collections::BTreeMap;

use polars::prelude::{NamedFrom, Series};

use ehr_model::fhir::ENCOUNTER;
use ehr_model::{PredictionType, ProblemConfig};

use crate::align::AlignmentMode;
use crate::datetime::whole_days_between;
use crate::error::{CoreError, Result};
use crate::graph::EntityGraph;
use crate::problem::ProblemDefinition;
use crate::problems::common::{
    PERIOD_END, encounter_config, encounter_stays, store_encounter_label,
};

pub const READMITTED_COLUMN: &str = "readmitted";
const SUBJECT_COLUMN: &str = "subject";

/// Whether the same patient is admitted again within a window after discharge.
///
/// Cutoffs are taken at discharge.
#[derive(Debug, Clone)]
pub struct Readmission {
    config: ProblemConfig,
    window_days: i64,
}

impl Readmission {
    pub const DEFAULT_WINDOW_DAYS: i64 = 30;

    pub fn new(window_days: i64) -> Self {
        Self {
            config: encounter_config(READMITTED_COLUMN, PERIOD_END, PredictionType::Classification),
            window_days,
        }
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }
}

impl Default for Readmission {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW_DAYS)
    }
}

impl ProblemDefinition for Readmission {
    fn name(&self) -> &str {
        "readmission"
    }

    fn config(&self) -> &ProblemConfig {
        &self.config
    }

    fn alignment_mode(&self) -> AlignmentMode {
        AlignmentMode::Discharge
    }

    fn generate_label(&self, graph: &mut EntityGraph) -> Result<()> {
        let stays = encounter_stays(graph, READMITTED_COLUMN)?;
        let encounter = graph.require(ENCOUNTER)?;
        let mut subjects = Vec::with_capacity(encounter.height());
        for idx in 0..encounter.height() {
            let subject = encounter.value(SUBJECT_COLUMN, idx).ok_or_else(|| {
                CoreError::missing_label(
                    ENCOUNTER,
                    READMITTED_COLUMN,
                    format!("encounter row {idx} has no {SUBJECT_COLUMN}"),
                )
            })?;
            subjects.push(subject);
        }

        let mut by_subject: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, subject) in subjects.iter().enumerate() {
            by_subject.entry(subject.as_str()).or_default().push(idx);
        }

        let mut readmitted = vec![false; stays.len()];
        for rows in by_subject.values() {
            for &idx in rows {
                let next = rows
                    .iter()
                    .map(|other| stays[*other].start)
                    .filter(|start| *start > stays[idx].start)
                    .min();
                readmitted[idx] = next.is_some_and(|start| {
                    whole_days_between(stays[idx].end, start) < self.window_days
                });
            }
        }
        store_encounter_label(graph, Series::new(READMITTED_COLUMN.into(), readmitted))
    }
}
