use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Output column names of a cutoff table, in order.
pub const CUTOFF_COLUMNS: [&str; 3] = ["instance_id", "cutoff_time", "label"];

/// Rendering of cutoff instants in output tables.
pub const CUTOFF_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl LabelValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Bool(value) => {
                if value {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// One labelled instance and the instant its features must stop at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffRecord {
    pub instance_id: String,
    pub cutoff_time: NaiveDateTime,
    pub label: LabelValue,
}

impl CutoffRecord {
    pub fn cutoff_time_string(&self) -> String {
        self.cutoff_time.format(CUTOFF_TIME_FORMAT).to_string()
    }
}
