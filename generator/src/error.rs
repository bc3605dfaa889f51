//! Generator error types

use thiserror::Error;
use shared::ApiFailure;

use crate::types::{RefereeIssue, Stage};

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// A request rejected before any model call, naming the offending field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Why model output could not be turned into JSON
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoObject,

    #[error("JSON object starting at byte {start} is never closed")]
    Unbalanced { start: usize },

    #[error("invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("unexpected shape: {message}")]
    Shape { message: String },
}

/// Generator error types
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model call failed during {stage}: {reason}")]
    TransientCall { stage: Stage, reason: ApiFailure },

    #[error("Unreadable {stage} output: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: ParseError,
    },

    #[error("Generation rejected after regeneration ({} issue(s))", issues.len())]
    GenerationFailed { issues: Vec<RefereeIssue> },

    #[error("Pipeline failed at the {stage} stage after {attempts} attempt(s)")]
    Pipeline {
        stage: Stage,
        attempts: u32,
        service_unavailable: bool,
    },

    #[error("Generation exceeded its {budget_secs}s budget")]
    Timeout { budget_secs: u64 },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Unexpected {stage} artifact: {message}")]
    InvalidTransition { stage: Stage, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl GeneratorError {
    /// Whether the failing stage may be re-invoked under the retry budget
    pub fn is_retryable(&self) -> bool {
        match self {
            GeneratorError::TransientCall { reason, .. } => reason.is_retryable(),
            GeneratorError::Parse { .. } => true,
            _ => false,
        }
    }

    /// Whether the failure points at the model service rather than its output
    pub fn indicates_outage(&self) -> bool {
        match self {
            GeneratorError::TransientCall { reason, .. } => reason.indicates_outage(),
            GeneratorError::Pipeline { service_unavailable, .. } => *service_unavailable,
            _ => false,
        }
    }
}
