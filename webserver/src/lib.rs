//! HTTP front door for drill generation, training plans and recommendations
//!
//! Wires the generator and recommender crates behind an axum router with
//! bearer-token auth, CORS and a per-user request cooldown.

pub mod error;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;
pub mod web;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::AppState;
pub use types::*;
pub use web::build_router;

// Re-export trait definitions
pub use traits::{ArtifactStore, TokenVerifier};

// Re-export service implementations
pub use services::{HttpTokenVerifier, InMemoryArtifactStore};
