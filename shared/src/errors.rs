//! Shared error types for the training content service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange { field: String, value: i64, min: i64, max: i64 },
}

pub type SharedResult<T> = Result<T, SharedError>;
