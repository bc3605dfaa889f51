//! Scoring constants

use serde::{Deserialize, Serialize};

use crate::error::{RecommenderError, RecommenderResult};

/// Base confidence and slope for one tier-1 rule, capped at `ceiling`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRule {
    /// Average below which the rule fires (ignored by rules without one)
    pub threshold: f64,
    pub base: f64,
    pub slope: f64,
    pub ceiling: f64,
}

impl ConfidenceRule {
    pub const fn new(threshold: f64, base: f64, slope: f64, ceiling: f64) -> Self {
        Self {
            threshold,
            base,
            slope,
            ceiling,
        }
    }

    /// `base + (threshold - average) * slope`, capped at the ceiling
    pub fn below_threshold(&self, average: f64) -> f64 {
        (self.base + (self.threshold - average) * self.slope).min(self.ceiling)
    }

    /// `base + (average - threshold) * slope`, capped at the ceiling
    pub fn above_threshold(&self, average: f64) -> f64 {
        (self.base + (average - self.threshold) * self.slope).min(self.ceiling)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Lookback windows in days, shortest first
    pub windows: Vec<i64>,
    /// Most recent sessions considered
    pub max_sessions: usize,
    /// Exercises completed this recently are never recommended
    pub recency_exclusion_days: i64,
    pub max_recommendations: usize,

    /// A skill practiced fewer times than this is a gap
    pub gap_min_frequency: u32,
    /// A skill averaging below this over all history is a gap
    pub gap_average: f64,

    /// Average within 14 days below 3.0
    pub recent_struggle: ConfidenceRule,
    pub recent_struggle_days: i64,
    /// Average within 7 days below 3.5
    pub very_recent_struggle: ConfidenceRule,
    pub very_recent_struggle_days: i64,
    /// Gap skill never practiced by a player with more than this many sessions
    pub never_practiced_min_sessions: usize,
    pub never_practiced_confidence: f64,
    /// Gap skill not practiced for longer than `stale_after_days`
    pub stale_after_days: i64,
    pub stale_max_extra_days: i64,
    pub stale: ConfidenceRule,
    /// Gap skill averaging below 3.0 over all history
    pub overall_struggle: ConfidenceRule,
    /// Generic gap and variety entries
    pub variety_base: f64,
    pub variety_max_jitter: f64,
    pub default_seed: u64,

    /// Skill mastered: average at or above this over at least `mastery_min_reps`
    pub mastery_average: f64,
    pub mastery_min_reps: u32,
    pub progression: ConfidenceRule,
    pub success: ConfidenceRule,

    /// Confidence when the player has no history at all
    pub new_player_confidence: f64,

    pub difficulty_exact_bonus: f64,
    pub difficulty_near_bonus: f64,
    pub difficulty_far_penalty: f64,

    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            windows: vec![3, 7, 14, 30],
            max_sessions: 30,
            recency_exclusion_days: 3,
            max_recommendations: 5,

            gap_min_frequency: 2,
            gap_average: 3.0,

            recent_struggle: ConfidenceRule::new(3.0, 0.82, 0.04, 0.90),
            recent_struggle_days: 14,
            very_recent_struggle: ConfidenceRule::new(3.5, 0.75, 0.06, 0.84),
            very_recent_struggle_days: 7,
            never_practiced_min_sessions: 5,
            never_practiced_confidence: 0.85,
            stale_after_days: 14,
            stale_max_extra_days: 10,
            stale: ConfidenceRule::new(0.0, 0.70, 0.01, 0.80),
            overall_struggle: ConfidenceRule::new(3.0, 0.65, 0.05, 0.75),
            variety_base: 0.55,
            variety_max_jitter: 0.10,
            default_seed: 42,

            mastery_average: 4.0,
            mastery_min_reps: 3,
            progression: ConfidenceRule::new(4.0, 0.72, 0.08, 0.80),
            success: ConfidenceRule::new(4.0, 0.62, 0.08, 0.70),

            new_player_confidence: 0.70,

            difficulty_exact_bonus: 0.08,
            difficulty_near_bonus: 0.03,
            difficulty_far_penalty: -0.10,

            min_confidence: 0.40,
            max_confidence: 0.90,
        }
    }
}

impl ScoringConfig {
    pub fn clamp(&self, confidence: f64) -> f64 {
        confidence.clamp(self.min_confidence, self.max_confidence)
    }

    /// Longest lookback window, used for category balance
    pub fn balance_window(&self) -> i64 {
        self.windows.iter().copied().max().unwrap_or(30)
    }

    pub fn validate(&self) -> RecommenderResult<()> {
        let invalid = |field: &'static str, reason: &str| {
            Err(RecommenderError::InvalidConfig {
                field,
                reason: reason.to_string(),
            })
        };

        if self.windows.is_empty() || self.windows.iter().any(|d| *d <= 0) {
            return invalid("windows", "must list positive day counts");
        }
        if !(0.0..=1.0).contains(&self.min_confidence)
            || !(0.0..=1.0).contains(&self.max_confidence)
            || self.min_confidence > self.max_confidence
        {
            return invalid("min_confidence", "must not exceed max_confidence within 0..=1");
        }
        if self.max_recommendations == 0 {
            return invalid("max_recommendations", "must be at least 1");
        }
        if !(self.variety_max_jitter >= 0.0 && self.variety_max_jitter.is_finite()) {
            return invalid("variety_max_jitter", "must be a finite, non-negative number");
        }
        Ok(())
    }
}
