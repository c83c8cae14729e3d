use polars::prelude::{NamedFrom, Series};

use ehr_model::{PredictionType, ProblemConfig};

use crate::error::Result;
use crate::graph::EntityGraph;
use crate::problem::ProblemDefinition;
use crate::problems::common::{
    PERIOD_START, encounter_codes, encounter_config, has_code, store_encounter_label,
};

pub const MORTALITY_COLUMN: &str = "mortality";
pub const DIAGNOSIS_COLUMN: &str = "diagnosis";

/// ICD-10 codes recorded for deaths and cardiac arrest.
pub const DEFAULT_MORTALITY_CODES: &[&str] = &["R99", "I46.1", "R96.0", "R96.1", "R98"];

/// Whether any diagnosis of an encounter is a death code.
#[derive(Debug, Clone)]
pub struct Mortality {
    config: ProblemConfig,
    codes: Vec<String>,
}

impl Mortality {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: encounter_config(MORTALITY_COLUMN, PERIOD_START, PredictionType::Classification),
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

impl Default for Mortality {
    fn default() -> Self {
        Self::new(DEFAULT_MORTALITY_CODES.iter().copied())
    }
}

impl ProblemDefinition for Mortality {
    fn name(&self) -> &str {
        "mortality"
    }

    fn config(&self) -> &ProblemConfig {
        &self.config
    }

    fn generate_label(&self, graph: &mut EntityGraph) -> Result<()> {
        let labels: Vec<bool> = encounter_codes(graph, MORTALITY_COLUMN)?
            .iter()
            .map(|codes| has_code(codes, &self.codes))
            .collect();
        store_encounter_label(graph, Series::new(MORTALITY_COLUMN.into(), labels))
    }
}

/// Whether an encounter carries one particular diagnosis code.
#[derive(Debug, Clone)]
pub struct DiagnosisPrediction {
    config: ProblemConfig,
    code: String,
}

impl DiagnosisPrediction {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            config: encounter_config(DIAGNOSIS_COLUMN, PERIOD_START, PredictionType::Classification),
            code: code.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl ProblemDefinition for DiagnosisPrediction {
    fn name(&self) -> &str {
        "diagnosis"
    }

    fn config(&self) -> &ProblemConfig {
        &self.config
    }

    fn generate_label(&self, graph: &mut EntityGraph) -> Result<()> {
        let wanted = [self.code.clone()];
        let labels: Vec<bool> = encounter_codes(graph, DIAGNOSIS_COLUMN)?
            .iter()
            .map(|codes| has_code(codes, &wanted))
            .collect();
        store_encounter_label(graph, Series::new(DIAGNOSIS_COLUMN.into(), labels))
    }
}
