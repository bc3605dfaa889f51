//! Service trait definitions for dependency injection
//!
//! Identity lookup and artifact persistence are external collaborators,
//! reached only through these traits.

use async_trait::async_trait;

use crate::error::WebServerResult;
use crate::types::{ArtifactRecord, Identity};

/// Resolves a bearer token to the user it belongs to
#[mockall::automock]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Fails with `Unauthorized` when the token is not accepted
    async fn verify(&self, token: &str) -> WebServerResult<Identity>;
}

/// Per-user storage of generated artifacts
#[mockall::automock]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Insert or replace the record with the same user and id
    async fn upsert(&self, record: ArtifactRecord) -> WebServerResult<()>;

    /// Names of the user's most recent drills, newest first
    async fn recent_drill_names(&self, user_id: &str, limit: usize) -> WebServerResult<Vec<String>>;
}
