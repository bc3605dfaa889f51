//! Bounds the number of model calls in flight across all requests

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use shared::ApiFailure;

use crate::traits::ModelClient;
use crate::types::{ModelRequest, ModelResponse};

/// Wraps a client so at most `max_in_flight` calls run at once; the rest queue
pub struct LimitedModelClient<C> {
    inner: C,
    permits: Arc<Semaphore>,
}

impl<C: ModelClient> LimitedModelClient<C> {
    pub fn new(inner: C, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl<C: ModelClient> ModelClient for LimitedModelClient<C> {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ApiFailure> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ApiFailure::ServiceUnavailable)?;
        self.inner.complete(request).await
    }
}
