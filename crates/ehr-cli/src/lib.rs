//! Library components of the `ehr` command line.

pub mod config;
pub mod logging;
pub mod pipeline;
