//! Bounded retry with fixed backoff, applied at every model call site

use std::future::Future;
use std::time::Duration;

use shared::logging::ServiceId;
use shared::{service_debug, service_warn};
use tokio::time::sleep;

use crate::error::{GeneratorError, GeneratorResult};
use crate::types::Stage;

const SERVICE: ServiceId = ServiceId::Generator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    /// `max_attempts` counts the first try; zero is treated as one
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    ///
    /// The closure receives the 1-based attempt number. Transient call and
    /// parse failures are retried; once the budget is gone they become
    /// [`GeneratorError::Pipeline`] naming `stage`. A model call that fails
    /// for a non-retryable reason (bad credentials, rejected request) ends
    /// the stage the same way without further attempts. Everything else is
    /// returned untouched.
    pub async fn execute<F, Fut, T>(&self, stage: Stage, mut operation: F) -> GeneratorResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = GeneratorResult<T>>,
    {
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        service_debug!(SERVICE, stage = %stage, attempt, "stage succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    service_warn!(
                        SERVICE,
                        stage = %stage,
                        attempt,
                        backoff_ms = self.backoff.as_millis() as u64,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(err @ (GeneratorError::TransientCall { .. } | GeneratorError::Parse { .. })) => {
                    service_warn!(SERVICE, stage = %stage, attempts = attempt, error = %err, "stage gave up");
                    return Err(GeneratorError::Pipeline {
                        stage,
                        attempts: attempt,
                        service_unavailable: err.indicates_outage(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use assert_matches::assert_matches;
    use shared::ApiFailure;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_succeeds_on_second_attempt() {
        let calls = AtomicU32::new(0);
        let result = policy()
            .execute(Stage::Coach, |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 1 {
                        Err(GeneratorError::Parse {
                            stage: Stage::Coach,
                            source: ParseError::NoObject,
                        })
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_becomes_pipeline_error() {
        let calls = AtomicU32::new(0);
        let result: GeneratorResult<()> = policy()
            .execute(Stage::Scout, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(GeneratorError::TransientCall {
                        stage: Stage::Scout,
                        reason: ApiFailure::Timeout,
                    })
                }
            })
            .await;

        assert_matches!(
            result,
            Err(GeneratorError::Pipeline { stage: Stage::Scout, attempts: 2, service_unavailable: true })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_call_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: GeneratorResult<()> = policy()
            .execute(Stage::Writer, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(GeneratorError::TransientCall {
                        stage: Stage::Writer,
                        reason: ApiFailure::AuthenticationFailed,
                    })
                }
            })
            .await;

        assert_matches!(
            result,
            Err(GeneratorError::Pipeline { stage: Stage::Writer, attempts: 1, service_unavailable: false })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_passes_through() {
        let result: GeneratorResult<()> = policy()
            .execute(Stage::Referee, |_| async { Err(GeneratorError::Cancelled) })
            .await;
        assert_matches!(result, Err(GeneratorError::Cancelled));
    }
}
