//! Prediction problem orchestration.
//!
//! [`generate_cutoff_times`] drives a problem through an explicit state
//! machine:
//!
//! ```text
//! CheckLabel -> CheckCutoff -> Align
//!     |   ^
//!     v   | (once)
//! GenerateLabel
//! ```
//!
//! A label that is still unusable after one generation attempt is fatal.

use polars::prelude::AnyValue;
use tracing::{info, warn};

use ehr_common::{any_to_i64, any_to_string, is_missing_value, parse_f64, parse_i64};
use ehr_model::{CutoffRecord, LabelValue, ProblemConfig};

use crate::align::{AlignmentMode, CutoffTimeAligner};
use crate::cutoff::CutoffTable;
use crate::error::{CoreError, Result};
use crate::graph::EntityGraph;

pub trait ProblemDefinition {
    fn name(&self) -> &str;

    fn config(&self) -> &ProblemConfig;

    fn alignment_mode(&self) -> AlignmentMode {
        AlignmentMode::Admission
    }

    /// Column of the cutoff table that closes each observation window.
    fn cutoff_end_label(&self) -> &str {
        "end"
    }

    /// Derives the label column and stores it with [`EntityGraph::replace_table`].
    fn generate_label(&self, graph: &mut EntityGraph) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemState {
    CheckLabel,
    GenerateLabel,
    CheckCutoff,
    Align,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelStatus {
    Ready,
    MissingTable,
    MissingColumn,
    Incomplete { missing: usize },
}

impl LabelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    fn reason(&self) -> String {
        match self {
            Self::Ready => "ready".to_string(),
            Self::MissingTable => "target table is absent".to_string(),
            Self::MissingColumn => "label column is absent".to_string(),
            Self::Incomplete { missing } => format!("{missing} rows have no value"),
        }
    }
}

/// Whether the label column of `config` exists and is fully populated.
pub fn label_status(graph: &EntityGraph, config: &ProblemConfig) -> LabelStatus {
    let Some(table) = graph.table(&config.target_entity) else {
        return LabelStatus::MissingTable;
    };
    if !table.has_column(&config.target_label_column) {
        return LabelStatus::MissingColumn;
    }
    let missing = table.height() - table.present_count(&config.target_label_column);
    if missing > 0 {
        LabelStatus::Incomplete { missing }
    } else {
        LabelStatus::Ready
    }
}

/// Produces the cutoff table of `problem`, generating its label first when
/// the graph does not carry it yet.
pub fn generate_cutoff_times(
    problem: &dyn ProblemDefinition,
    graph: &mut EntityGraph,
) -> Result<CutoffTable> {
    let config = problem.config();
    let mut state = ProblemState::CheckLabel;
    let mut regenerated = false;
    loop {
        state = match state {
            ProblemState::CheckLabel => match label_status(graph, config) {
                LabelStatus::Ready => ProblemState::CheckCutoff,
                status if !regenerated => {
                    info!(
                        problem = problem.name(),
                        table = %config.target_entity,
                        column = %config.target_label_column,
                        reason = %status.reason(),
                        "generating label"
                    );
                    ProblemState::GenerateLabel
                }
                status => {
                    return Err(CoreError::missing_label(
                        &config.target_entity,
                        &config.target_label_column,
                        status.reason(),
                    ));
                }
            },
            ProblemState::GenerateLabel => {
                regenerated = true;
                problem.generate_label(graph)?;
                ProblemState::CheckLabel
            }
            ProblemState::CheckCutoff => {
                check_cutoff(problem, graph)?;
                ProblemState::Align
            }
            ProblemState::Align => {
                let table = align_cutoffs(problem, graph)?;
                info!(
                    problem = problem.name(),
                    records = table.len(),
                    gaps = table.gaps,
                    "generated cutoff times"
                );
                return Ok(table);
            }
        };
    }
}

fn window_columns(problem: &dyn ProblemDefinition) -> (Option<&str>, &str) {
    let config = problem.config();
    match problem.alignment_mode() {
        AlignmentMode::Admission => (
            Some(config.cutoff_time_label.as_str()),
            problem.cutoff_end_label(),
        ),
        AlignmentMode::Discharge => (None, config.cutoff_time_label.as_str()),
    }
}

fn check_cutoff(problem: &dyn ProblemDefinition, graph: &EntityGraph) -> Result<()> {
    let config = problem.config();
    let missing = |column: &str| CoreError::MissingCutoff {
        table: config.cutoff_entity.clone(),
        column: column.to_string(),
    };
    let Some(table) = graph.table(&config.cutoff_entity) else {
        return Err(missing(&config.cutoff_time_label));
    };
    let (start, end) = window_columns(problem);
    for column in start.into_iter().chain([end]) {
        if !table.has_column(column) {
            return Err(missing(column));
        }
    }
    Ok(())
}

fn align_cutoffs(problem: &dyn ProblemDefinition, graph: &EntityGraph) -> Result<CutoffTable> {
    let config = problem.config();
    let cutoff_table = graph.require(&config.cutoff_entity)?;
    let (start, end) = window_columns(problem);
    let start = start.or(cutoff_table.time_index_column.as_deref());
    let alignment =
        CutoffTimeAligner::new(problem.alignment_mode()).align_table(cutoff_table, start, end)?;

    let target = graph.require(&config.target_entity)?;
    let links = graph.link_rows(&config.target_entity, &config.cutoff_entity)?;

    let mut records = Vec::with_capacity(target.height());
    let mut gaps = 0;
    for (idx, linked) in links.iter().enumerate() {
        let cutoff_time = linked
            .iter()
            .find_map(|row| alignment.rows[*row].cutoff_time);
        let (Some(instance_id), Some(cutoff_time)) = (target.identifier(idx), cutoff_time) else {
            gaps += 1;
            continue;
        };
        let value = target.any_value(&config.target_label_column, idx);
        let label = coerce_label(&value).ok_or_else(|| {
            CoreError::missing_label(
                &config.target_entity,
                &config.target_label_column,
                format!("value {} of {instance_id} is not a label", any_to_string(value.clone())),
            )
        })?;
        records.push(CutoffRecord {
            instance_id,
            cutoff_time,
            label,
        });
    }
    if gaps > 0 {
        warn!(
            problem = problem.name(),
            gaps, "rows without a cutoff time were dropped"
        );
    }
    Ok(CutoffTable { records, gaps })
}

/// Reads a label cell as a boolean, integer or float.
pub fn coerce_label(value: &AnyValue<'_>) -> Option<LabelValue> {
    if is_missing_value(value) {
        return None;
    }
    match value {
        AnyValue::Boolean(flag) => Some(LabelValue::Bool(*flag)),
        AnyValue::Int8(_)
        | AnyValue::Int16(_)
        | AnyValue::Int32(_)
        | AnyValue::Int64(_)
        | AnyValue::UInt8(_)
        | AnyValue::UInt16(_)
        | AnyValue::UInt32(_)
        | AnyValue::UInt64(_) => any_to_i64(value.clone()).map(LabelValue::Int),
        AnyValue::Float32(v) => Some(LabelValue::Float(f64::from(*v))),
        AnyValue::Float64(v) => Some(LabelValue::Float(*v)),
        other => coerce_label_text(any_to_string(other.clone()).trim()),
    }
}

fn coerce_label_text(text: &str) -> Option<LabelValue> {
    if text.eq_ignore_ascii_case("true") {
        return Some(LabelValue::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Some(LabelValue::Bool(false));
    }
    if let Some(value) = parse_i64(text) {
        return Some(LabelValue::Int(value));
    }
    parse_f64(text).map(LabelValue::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_typed_and_text_labels() {
        assert_eq!(coerce_label(&AnyValue::Boolean(true)), Some(LabelValue::Bool(true)));
        assert_eq!(coerce_label(&AnyValue::Int32(3)), Some(LabelValue::Int(3)));
        assert_eq!(coerce_label(&AnyValue::Float64(2.5)), Some(LabelValue::Float(2.5)));
        assert_eq!(coerce_label(&AnyValue::String("False")), Some(LabelValue::Bool(false)));
        assert_eq!(coerce_label(&AnyValue::String("12")), Some(LabelValue::Int(12)));
        assert_eq!(coerce_label(&AnyValue::String("0.25")), Some(LabelValue::Float(0.25)));
    }

    #[test]
    fn rejects_missing_and_text_labels() {
        assert_eq!(coerce_label(&AnyValue::Null), None);
        assert_eq!(coerce_label(&AnyValue::Float64(f64::NAN)), None);
        assert_eq!(coerce_label(&AnyValue::String("unknown")), None);
        assert_eq!(coerce_label(&AnyValue::String("long")), None);
    }
}
