//! History aggregation and scoring

pub mod history;
pub mod scorer;
