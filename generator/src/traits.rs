//! Generator trait definitions for dependency injection

use async_trait::async_trait;

use shared::ApiFailure;
use crate::types::{ModelRequest, ModelResponse};

/// Text-generation model endpoint
#[mockall::automock]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt and return the raw completion text
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ApiFailure>;
}
