//! Shared utilities for the EHR graph crates.
//!
//! This crate provides the polars `AnyValue` helpers used across the
//! workspace and the vocabulary of recognised missing-value sentinels.

pub mod missing;
pub mod values;

pub use missing::{MISSING_SENTINELS, is_missing_text, is_missing_value};
pub use values::{any_to_i64, any_to_string, format_numeric, parse_f64, parse_i64};
