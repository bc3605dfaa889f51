//! Generation settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::retry::RetryPolicy;
use crate::error::{GeneratorError, GeneratorResult};
use crate::types::Stage;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Sampling settings for one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl StageSettings {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self { temperature, max_tokens }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Model used by the drill stages
    pub model: String,
    /// Model used for training plans
    pub plan_model: String,
    /// Root of an OpenAI-compatible API, without the `/chat/completions` suffix
    pub base_url: String,
    pub scout: StageSettings,
    pub coach: StageSettings,
    pub writer: StageSettings,
    pub referee: StageSettings,
    pub plan: StageSettings,
    pub call_timeout_secs: u64,
    /// Attempts per stage, counting the first
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub max_concurrent_calls: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".to_string(),
            plan_model: "gpt-4".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            scout: StageSettings::new(0.3, 500),
            coach: StageSettings::new(0.4, 600),
            writer: StageSettings::new(0.6, 1500),
            referee: StageSettings::new(0.1, 800),
            plan: StageSettings::new(0.7, 4000),
            call_timeout_secs: 60,
            retry_attempts: 2,
            retry_backoff_ms: 500,
            max_concurrent_calls: 8,
        }
    }
}

impl GeneratorConfig {
    /// Model calls in a drill run that exhausts its one regeneration:
    /// Scout, Coach, two Writer passes and two Referee reviews
    pub const DRILL_CALLS_PER_RUN: u32 = 6;
    pub const PLAN_CALLS_PER_RUN: u32 = 2;

    pub fn stage(&self, stage: Stage) -> StageSettings {
        match stage {
            Stage::Scout => self.scout,
            Stage::Coach => self.coach,
            Stage::Writer => self.writer,
            Stage::Referee => self.referee,
            Stage::Plan => self.plan,
        }
    }

    pub fn model_for(&self, stage: Stage) -> &str {
        match stage {
            Stage::Plan => &self.plan_model,
            _ => &self.model,
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_backoff_ms))
    }

    /// Wall-clock budget for `calls` model calls, each allowed its full
    /// retry budget
    pub fn budget_for(&self, calls: u32) -> Duration {
        let attempts = self.retry_attempts.max(1);
        let per_call = self.call_timeout() * attempts + Duration::from_millis(self.retry_backoff_ms) * (attempts - 1);
        per_call * calls
    }

    pub fn drill_budget(&self) -> Duration {
        self.budget_for(Self::DRILL_CALLS_PER_RUN)
    }

    /// One plan call plus a single regeneration
    pub fn plan_budget(&self) -> Duration {
        self.budget_for(Self::PLAN_CALLS_PER_RUN)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> GeneratorResult<()> {
        let base = url::Url::parse(&self.base_url).map_err(|e| GeneratorError::Config {
            message: format!("base_url '{}' is not a valid URL: {}", self.base_url, e),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(GeneratorError::Config {
                message: format!("base_url must be http or https, got '{}'", base.scheme()),
            });
        }
        if self.model.trim().is_empty() || self.plan_model.trim().is_empty() {
            return Err(GeneratorError::Config {
                message: "model names must not be empty".to_string(),
            });
        }
        for stage in [Stage::Scout, Stage::Coach, Stage::Writer, Stage::Referee, Stage::Plan] {
            let settings = self.stage(stage);
            if !(0.0..=2.0).contains(&settings.temperature) {
                return Err(GeneratorError::Config {
                    message: format!("{stage} temperature {} outside 0.0..=2.0", settings.temperature),
                });
            }
            if settings.max_tokens == 0 {
                return Err(GeneratorError::Config {
                    message: format!("{stage} max_tokens must be positive"),
                });
            }
        }
        let writer = self.writer.temperature;
        if [self.scout, self.coach, self.referee].iter().any(|s| s.temperature >= writer) {
            return Err(GeneratorError::Config {
                message: "writer must sample at the highest temperature of the drill stages".to_string(),
            });
        }
        if self.retry_attempts == 0 {
            return Err(GeneratorError::Config {
                message: "retry_attempts must be at least 1".to_string(),
            });
        }
        if self.call_timeout_secs == 0 {
            return Err(GeneratorError::Config {
                message: "call_timeout_secs must be positive".to_string(),
            });
        }
        if self.max_concurrent_calls == 0 {
            return Err(GeneratorError::Config {
                message: "max_concurrent_calls must be positive".to_string(),
            });
        }
        Ok(())
    }
}
