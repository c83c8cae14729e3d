use chrono::NaiveDateTime;
use polars::prelude::{DataFrame, Series};

use ehr_model::fhir::{
    CODEABLE_CONCEPT, CODING, CONDITION, ENCOUNTER, ENCOUNTER_DIAGNOSIS, PERIOD,
};
use ehr_model::{PredictionType, ProblemConfig};

use crate::datetime::{instant_at, whole_days_between};
use crate::error::{CoreError, Result};
use crate::graph::EntityGraph;

pub(crate) const PERIOD_START: &str = "start";
pub(crate) const PERIOD_END: &str = "end";

/// Path from an encounter to the codings of its diagnoses.
const DIAGNOSIS_PATH: [&str; 4] = [ENCOUNTER_DIAGNOSIS, CONDITION, CODEABLE_CONCEPT, CODING];
const CODE_COLUMN: &str = "code";

/// Config shared by the encounter-level problems.
pub(crate) fn encounter_config(
    label: &str,
    cutoff_time_label: &str,
    prediction_type: PredictionType,
) -> ProblemConfig {
    ProblemConfig::new(ENCOUNTER, label, PERIOD, cutoff_time_label, prediction_type)
}

/// Start and end of the period each encounter links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stay {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Stay {
    pub fn days(&self) -> i64 {
        whole_days_between(self.start, self.end)
    }
}

/// One [`Stay`] per encounter row.
///
/// Every encounter must link to a period carrying both a start and an end.
pub(crate) fn encounter_stays(graph: &EntityGraph, label: &str) -> Result<Vec<Stay>> {
    let fail = |reason: String| CoreError::missing_label(ENCOUNTER, label, reason);
    if !graph.contains(ENCOUNTER) {
        return Err(fail(format!("table {ENCOUNTER} is not loaded")));
    }
    let Some(period) = graph.table(PERIOD) else {
        return Err(fail(format!("table {PERIOD} is not loaded")));
    };
    for column in [PERIOD_START, PERIOD_END] {
        if !period.has_column(column) {
            return Err(fail(format!("{PERIOD}.{column} is absent")));
        }
    }
    if graph.linking_edge(ENCOUNTER, PERIOD).is_none() {
        return Err(fail(format!("no relationship links {ENCOUNTER} to {PERIOD}")));
    }

    let links = graph.link_rows(ENCOUNTER, PERIOD)?;
    let mut stays = Vec::with_capacity(links.len());
    for (idx, rows) in links.iter().enumerate() {
        let stay = rows.first().and_then(|row| {
            Some(Stay {
                start: instant_at(&period.data, PERIOD_START, *row)?,
                end: instant_at(&period.data, PERIOD_END, *row)?,
            })
        });
        let Some(stay) = stay else {
            return Err(fail(format!("encounter row {idx} has no complete period")));
        };
        stays.push(stay);
    }
    Ok(stays)
}

/// Diagnosis codes reached from each encounter row.
pub(crate) fn encounter_codes(graph: &EntityGraph, label: &str) -> Result<Vec<Vec<String>>> {
    graph
        .traverse(ENCOUNTER, &DIAGNOSIS_PATH, CODE_COLUMN)
        .map_err(|err| CoreError::missing_label(ENCOUNTER, label, err.to_string()))
}

pub(crate) fn has_code(codes: &[String], wanted: &[String]) -> bool {
    codes
        .iter()
        .any(|code| wanted.iter().any(|want| want.eq_ignore_ascii_case(code)))
}

/// Writes `values` into the encounter table as column `label`.
pub(crate) fn store_encounter_label(graph: &mut EntityGraph, label: Series) -> Result<()> {
    let encounter = graph.require(ENCOUNTER)?;
    let mut data: DataFrame = encounter.data.clone();
    data.with_column(label)?;
    graph.replace_table(ENCOUNTER, data)?;
    Ok(())
}
