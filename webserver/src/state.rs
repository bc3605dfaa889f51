//! Webserver state shared by every request handler

use std::sync::Arc;

use chrono::Duration;

use generator::{DrillPipeline, GeneratorConfig, ModelClient, PlanGenerator};
use recommender::{Scorer, ScoringConfig};
use shared::{Clock, CooldownGate, SystemClock};

use crate::error::{WebServerError, WebServerResult};
use crate::traits::{ArtifactStore, TokenVerifier};

pub const DEFAULT_COOLDOWN_SECS: i64 = 10;

/// Everything a handler needs; cloning shares all components
#[derive(Clone)]
pub struct AppState {
    pub drills: DrillPipeline,
    pub plans: PlanGenerator,
    pub scorer: Arc<Scorer>,
    /// `None` leaves every token unverifiable
    pub verifier: Option<Arc<dyn TokenVerifier>>,
    pub store: Arc<dyn ArtifactStore>,
    /// Keyed by user, route and body digest
    pub cooldown: CooldownGate<String>,
    pub clock: Arc<dyn Clock>,
    pub allow_unauthenticated: bool,
    /// Reported back in generation envelopes
    pub model_version: String,
}

impl AppState {
    pub fn new(client: Arc<dyn ModelClient>, config: GeneratorConfig, store: Arc<dyn ArtifactStore>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            drills: DrillPipeline::new(client.clone(), config.clone()),
            plans: PlanGenerator::new(client, config.clone()),
            scorer: Arc::new(Scorer::default()),
            verifier: None,
            store,
            cooldown: CooldownGate::new(Duration::seconds(DEFAULT_COOLDOWN_SECS), clock.clone()),
            clock,
            allow_unauthenticated: false,
            model_version: config.model,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_scoring(mut self, config: ScoringConfig) -> WebServerResult<Self> {
        let scorer = Scorer::new(config).map_err(|e| WebServerError::config(e.to_string()))?;
        self.scorer = Arc::new(scorer);
        Ok(self)
    }

    /// Replace the clock, restarting the cooldown window on it
    pub fn with_clock(mut self, clock: Arc<dyn Clock>, cooldown: Duration) -> Self {
        self.cooldown = CooldownGate::new(cooldown, clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = CooldownGate::new(cooldown, self.clock.clone());
        self
    }

    pub fn allow_unauthenticated(mut self, allow: bool) -> Self {
        self.allow_unauthenticated = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use generator::MockModelClient;

    use crate::services::InMemoryArtifactStore;

    fn state() -> AppState {
        AppState::new(
            Arc::new(MockModelClient::new()),
            GeneratorConfig::default(),
            Arc::new(InMemoryArtifactStore::new()),
        )
    }

    #[test]
    fn test_with_scoring_rejects_invalid_config() {
        let inverted = ScoringConfig {
            min_confidence: 0.9,
            max_confidence: 0.4,
            ..Default::default()
        };
        assert_matches!(state().with_scoring(inverted).err(), Some(WebServerError::Config { .. }));

        let custom = ScoringConfig {
            max_recommendations: 3,
            ..Default::default()
        };
        let scored = state().with_scoring(custom).unwrap();
        assert_eq!(scored.scorer.config().max_recommendations, 3);
    }
}
