//! Reusable encounter-level prediction problems.

mod common;
pub mod diagnosis;
pub mod length_of_stay;
pub mod readmission;

pub use diagnosis::{DEFAULT_MORTALITY_CODES, DiagnosisPrediction, Mortality};
pub use length_of_stay::{DURATION_TABLE, LengthOfStay, ProlongedLengthOfStay};
pub use readmission::Readmission;
