//! Error types for graph assembly and cutoff generation.
//!
//! Every variant names the table and, where relevant, the column involved.
//! Schema errors are fatal configuration problems; a missing label is
//! recoverable once through label generation.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table {table} has none of the identifier columns {candidates}")]
    MissingIdentifier { table: String, candidates: String },

    #[error("table {table} has duplicate identifier {value} in column {column}")]
    DuplicateIdentifier {
        table: String,
        column: String,
        value: String,
    },

    #[error("table {table} is declared more than once")]
    DuplicateTable { table: String },

    #[error("no record type is registered for table {table}")]
    UnknownRecordType { table: String },

    #[error("table {table} is not part of the graph")]
    UnknownTable { table: String },

    #[error("relationship {edge} references missing column {column} of table {table}")]
    UnknownColumn {
        table: String,
        column: String,
        edge: String,
    },

    #[error("relationship {edge} uses {table}.{column}, which is not unique")]
    NonUniqueKey {
        table: String,
        column: String,
        edge: String,
    },

    #[error("table {table} needs time index column {column}")]
    MissingTimeIndex { table: String, column: String },

    #[error("table {table} time index {column} has unparseable instant {value}")]
    InvalidTimeIndex {
        table: String,
        column: String,
        value: String,
    },

    #[error("replacement for table {table} drops identifier column {column}")]
    IdentifierRemoved { table: String, column: String },

    #[error("no relationship links table {from} to table {to}")]
    NoRelationshipPath { from: String, to: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("label {column} of table {table} is unusable: {reason}")]
    MissingLabel {
        table: String,
        column: String,
        reason: String,
    },

    #[error("cutoff column {column} of table {table} does not exist")]
    MissingCutoff { table: String, column: String },

    #[error("frame operation failed: {0}")]
    Frame(#[from] PolarsError),

    #[error("failed to write cutoff table: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    pub(crate) fn missing_label(
        table: impl Into<String>,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MissingLabel {
            table: table.into(),
            column: column.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
