//! Optional TOML run configuration.
//!
//! ```toml
//! [problem]
//! prolonged_threshold_days = 7
//! readmission_window_days = 30
//! mortality_codes = ["R99", "I46.1"]
//! diagnosis_code = "I10"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use ehr_core::problems::{DEFAULT_MORTALITY_CODES, ProlongedLengthOfStay, Readmission};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub problem: ProblemSettings,
}

/// Tunables of the built-in prediction problems.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProblemSettings {
    pub prolonged_threshold_days: i64,
    pub readmission_window_days: i64,
    pub mortality_codes: Vec<String>,
    pub diagnosis_code: Option<String>,
}

impl Default for ProblemSettings {
    fn default() -> Self {
        Self {
            prolonged_threshold_days: ProlongedLengthOfStay::DEFAULT_THRESHOLD_DAYS,
            readmission_window_days: Readmission::DEFAULT_WINDOW_DAYS,
            mortality_codes: DEFAULT_MORTALITY_CODES
                .iter()
                .map(|code| (*code).to_string())
                .collect(),
            diagnosis_code: None,
        }
    }
}

impl RunConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse run configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read run configuration {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Configuration at `path`, or the defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
