//! Error types for ingestion.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to build frame for {path}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("csv {path} has duplicate column {column}")]
    DuplicateColumn { path: PathBuf, column: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
