//! Shared types for the training content service
//!
//! Contains the domain model shared by the generator, the recommender and the
//! webserver, plus the cross-cutting pieces every crate needs: error type,
//! logging setup, clock and TTL cache.

pub mod cache;
pub mod clock;
pub mod errors;
pub mod logging;
pub mod types;

pub use cache::{CooldownGate, TtlCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::*;
pub use types::*;
