//! Recommender error types

use thiserror::Error;

pub type RecommenderResult<T> = Result<T, RecommenderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommenderError {
    #[error("Invalid scoring configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}
