use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionType {
    Classification,
    Regression,
}

impl fmt::Display for PredictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classification => f.write_str("classification"),
            Self::Regression => f.write_str("regression"),
        }
    }
}

/// Where the label of a prediction problem lives and where its cutoff
/// times come from. One value per problem instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub target_entity: String,
    pub target_label_column: String,
    pub cutoff_entity: String,
    pub cutoff_time_label: String,
    pub prediction_type: PredictionType,
}

impl ProblemConfig {
    pub fn new(
        target_entity: impl Into<String>,
        target_label_column: impl Into<String>,
        cutoff_entity: impl Into<String>,
        cutoff_time_label: impl Into<String>,
        prediction_type: PredictionType,
    ) -> Self {
        Self {
            target_entity: target_entity.into(),
            target_label_column: target_label_column.into(),
            cutoff_entity: cutoff_entity.into(),
            cutoff_time_label: cutoff_time_label.into(),
            prediction_type,
        }
    }
}
