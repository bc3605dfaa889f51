//! Exercise recommendations from a player's training history

pub mod config;
pub mod core;
pub mod error;

pub use config::ScoringConfig;
pub use crate::core::history::{aggregate, HistorySummary, PerformanceWindow, SkillStats};
pub use crate::core::scorer::Scorer;
pub use error::{RecommenderError, RecommenderResult};
