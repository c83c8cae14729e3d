use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("record type {0} is registered twice")]
    DuplicateRecordType(String),
    #[error("record type name must not be empty")]
    EmptyRecordTypeName,
}

pub type Result<T> = std::result::Result<T, ModelError>;
