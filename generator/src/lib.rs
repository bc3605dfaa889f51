//! Drill and training plan generation
//!
//! A drill request runs through four model stages (Scout, Coach, Writer,
//! Referee) with one regeneration on rejection. A plan request is a single
//! model stage followed by programmatic checks.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

pub use config::GeneratorConfig;
pub use crate::core::{DrillPipeline, PlanGenerator};
pub use error::{GeneratorError, GeneratorResult, ParseError, ValidationError};
pub use services::{LimitedModelClient, RealModelClient};
pub use traits::*;
pub use types::*;
