//! Entity graph assembly and cutoff-time generation for clinical records.
//!
//! Loaded record frames are validated into an [`EntityGraph`] by the
//! [`EntityGraphBuilder`]. A [`ProblemDefinition`] then names a label column
//! and a cutoff table, and [`generate_cutoff_times`] produces the labelled
//! cutoff table, deriving the label first when the graph lacks it.

pub mod align;
pub mod builder;
pub mod cutoff;
pub mod datetime;
pub mod error;
pub mod graph;
pub mod problem;
pub mod problems;
pub mod table;

pub use align::{AlignedRow, Alignment, AlignmentMode, CutoffTimeAligner, IntervalRow};
pub use builder::EntityGraphBuilder;
pub use cutoff::CutoffTable;
pub use error::{CoreError, Result, SchemaError};
pub use graph::{EntityGraph, GraphSummary, TableSummary};
pub use problem::{
    LabelStatus, ProblemDefinition, ProblemState, coerce_label, generate_cutoff_times,
    label_status,
};
pub use table::RecordTable;
