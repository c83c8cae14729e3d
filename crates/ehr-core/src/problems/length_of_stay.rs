use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use tracing::info;

use ehr_model::fhir::ENCOUNTER;
use ehr_model::{PredictionType, ProblemConfig, RelationshipEdge};

use crate::error::Result;
use crate::graph::EntityGraph;
use crate::problem::ProblemDefinition;
use crate::problems::common::{
    PERIOD_START, encounter_config, encounter_stays, store_encounter_label,
};

pub const LENGTH_COLUMN: &str = "length";
pub const PROLONGED_COLUMN: &str = "prolonged";
/// Side table holding one row per distinct length of stay.
pub const DURATION_TABLE: &str = "Duration";

/// Whole days between admission and discharge of each encounter.
#[derive(Debug, Clone)]
pub struct LengthOfStay {
    config: ProblemConfig,
}

impl LengthOfStay {
    pub fn new() -> Self {
        Self {
            config: encounter_config(LENGTH_COLUMN, PERIOD_START, PredictionType::Regression),
        }
    }
}

impl Default for LengthOfStay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemDefinition for LengthOfStay {
    fn name(&self) -> &str {
        "length_of_stay"
    }

    fn config(&self) -> &ProblemConfig {
        &self.config
    }

    fn generate_label(&self, graph: &mut EntityGraph) -> Result<()> {
        let lengths: Vec<i64> = encounter_stays(graph, LENGTH_COLUMN)?
            .iter()
            .map(|stay| stay.days())
            .collect();
        let distinct: Vec<i64> = lengths
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        store_encounter_label(graph, Series::new(LENGTH_COLUMN.into(), lengths))?;

        let duration = DataFrame::new(vec![Column::new("object_id".into(), distinct)])?;
        graph.replace_table(DURATION_TABLE, duration)?;
        graph.add_relationship(RelationshipEdge::new(
            DURATION_TABLE,
            "object_id",
            ENCOUNTER,
            LENGTH_COLUMN,
        ))?;
        info!(
            durations = graph.table(DURATION_TABLE).map_or(0, |table| table.height()),
            "derived length of stay"
        );
        Ok(())
    }
}

/// Whether an encounter lasts longer than a threshold of whole days.
#[derive(Debug, Clone)]
pub struct ProlongedLengthOfStay {
    config: ProblemConfig,
    threshold_days: i64,
}

impl ProlongedLengthOfStay {
    pub const DEFAULT_THRESHOLD_DAYS: i64 = 7;

    pub fn new(threshold_days: i64) -> Self {
        Self {
            config: encounter_config(PROLONGED_COLUMN, PERIOD_START, PredictionType::Classification),
            threshold_days,
        }
    }

    pub fn threshold_days(&self) -> i64 {
        self.threshold_days
    }
}

impl Default for ProlongedLengthOfStay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD_DAYS)
    }
}

impl ProblemDefinition for ProlongedLengthOfStay {
    fn name(&self) -> &str {
        "prolonged_length_of_stay"
    }

    fn config(&self) -> &ProblemConfig {
        &self.config
    }

    fn generate_label(&self, graph: &mut EntityGraph) -> Result<()> {
        let prolonged: Vec<bool> = encounter_stays(graph, PROLONGED_COLUMN)?
            .iter()
            .map(|stay| stay.days() > self.threshold_days)
            .collect();
        store_encounter_label(graph, Series::new(PROLONGED_COLUMN.into(), prolonged))
    }
}
