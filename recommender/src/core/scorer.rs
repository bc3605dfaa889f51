//! Heuristic exercise ranking

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shared::logging::ServiceId;
use shared::{service_debug, CandidateExercise, PlayerProfile, PriorityTier, Recommendation, RecommendationRequest};

use crate::config::ScoringConfig;
use crate::error::RecommenderResult;
use crate::core::history::{aggregate, skill_key, HistorySummary};

const SERVICE: ServiceId = ServiceId::Recommender;

/// Confidence before the difficulty adjustment, with its tier and reason
#[derive(Debug, Clone, PartialEq)]
struct Scored {
    tier: PriorityTier,
    confidence: f64,
    reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    /// Fails when the configuration could make scoring panic, such as
    /// inverted confidence bounds or a negative jitter
    pub fn new(config: ScoringConfig) -> RecommenderResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn summarize(&self, request: &RecommendationRequest, now: DateTime<Utc>) -> HistorySummary {
        aggregate(&request.recent_sessions, now, &self.config.windows, self.config.max_sessions)
    }

    /// Rank `request.candidates`, best first, at most `max_recommendations`.
    /// Identical inputs, `now` and seed always produce identical output.
    pub fn recommend(&self, request: &RecommendationRequest, now: DateTime<Utc>) -> Vec<Recommendation> {
        let summary = self.summarize(request, now);
        let player_level = request
            .player_profile
            .as_ref()
            .and_then(PlayerProfile::experience)
            .map(|e| e.level());
        let mut rng = StdRng::seed_from_u64(request.seed.unwrap_or(self.config.default_seed));

        let mut seen = HashSet::new();
        let mut ranked: Vec<Recommendation> = request
            .candidates
            .iter()
            .filter(|c| seen.insert(c.id.as_str()))
            .filter(|c| !summary.completed_within(&c.id, self.config.recency_exclusion_days))
            .filter_map(|candidate| {
                let scored = if summary.is_empty() {
                    Some(self.new_player(candidate))
                } else {
                    self.score(candidate, &summary, &mut rng)
                }?;
                let confidence = self.config.clamp(scored.confidence + self.difficulty_adjustment(player_level, candidate.difficulty));
                Some(Recommendation {
                    exercise_id: candidate.id.clone(),
                    exercise_name: candidate.name.clone(),
                    reason: scored.reason,
                    confidence,
                    priority_tier: scored.tier,
                    category: candidate.category,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.priority_tier
                .cmp(&b.priority_tier)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| a.exercise_name.cmp(&b.exercise_name))
        });
        ranked.truncate(self.config.max_recommendations);

        service_debug!(
            SERVICE,
            candidates = request.candidates.len(),
            returned = ranked.len(),
            sessions = summary.total_sessions,
            "scored recommendations"
        );
        ranked
    }

    fn new_player(&self, candidate: &CandidateExercise) -> Scored {
        Scored {
            tier: PriorityTier::Variety,
            confidence: self.config.new_player_confidence,
            reason: format!("A good {} starting point while we learn your game", candidate.category),
        }
    }

    /// First matching tier wins: skill gap, progression, success, variety
    fn score(&self, candidate: &CandidateExercise, summary: &HistorySummary, rng: &mut StdRng) -> Option<Scored> {
        let skills: Vec<&str> = if candidate.target_skills.is_empty() {
            vec![candidate.name.as_str()]
        } else {
            candidate.target_skills.iter().map(String::as_str).collect()
        };

        let gaps: Vec<&str> = skills.iter().copied().filter(|skill| self.is_gap(skill, summary)).collect();
        if !gaps.is_empty() {
            return gaps
                .iter()
                .filter_map(|skill| self.gap_confidence(skill, summary))
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                .or_else(|| Some(self.variety(candidate, rng)));
        }

        if let Some(scored) = skills.iter().find_map(|skill| self.progression(skill, candidate, summary)) {
            return Some(scored);
        }

        if let Some(scored) = skills.iter().find_map(|skill| self.success(skill, summary)) {
            return Some(scored);
        }

        summary
            .least_represented(self.config.balance_window())
            .contains(&candidate.category)
            .then(|| self.variety(candidate, rng))
    }

    fn variety(&self, candidate: &CandidateExercise, rng: &mut StdRng) -> Scored {
        let jitter = rng.gen_range(0.0..=self.config.variety_max_jitter);
        Scored {
            tier: PriorityTier::Variety,
            confidence: self.config.variety_base + jitter,
            reason: format!("Adds {} work to balance your training", candidate.category),
        }
    }

    fn is_gap(&self, skill: &str, summary: &HistorySummary) -> bool {
        let stats = summary.stats(skill);
        stats.count < self.config.gap_min_frequency || stats.average().is_some_and(|avg| avg < self.config.gap_average)
    }

    /// Tier-1 rules in strict order; `None` for a generic gap
    fn gap_confidence(&self, skill: &str, summary: &HistorySummary) -> Option<Scored> {
        let config = &self.config;
        let name = skill_key(skill);
        let gap = |confidence: f64, reason: String| {
            Some(Scored {
                tier: PriorityTier::SkillGap,
                confidence,
                reason,
            })
        };

        if let Some(avg) = summary
            .average_within(skill, config.recent_struggle_days)
            .filter(|avg| *avg < config.recent_struggle.threshold)
        {
            return gap(
                config.recent_struggle.below_threshold(avg),
                format!("Your recent {name} average is {avg:.1}/5"),
            );
        }

        if let Some(avg) = summary
            .average_within(skill, config.very_recent_struggle_days)
            .filter(|avg| *avg < config.very_recent_struggle.threshold)
        {
            return gap(
                config.very_recent_struggle.below_threshold(avg),
                format!("Your {name} rating this week is {avg:.1}/5"),
            );
        }

        let stats = summary.stats(skill);
        if stats.count == 0 && summary.total_sessions > config.never_practiced_min_sessions {
            return gap(
                config.never_practiced_confidence,
                format!("You haven't practiced {name} in {} sessions", summary.total_sessions),
            );
        }

        if let Some(days) = summary
            .days_since_practiced(skill)
            .filter(|days| *days > config.stale_after_days)
        {
            let extra = (days - config.stale_after_days).min(config.stale_max_extra_days);
            return gap(
                config.stale.above_threshold(extra as f64),
                format!("It's been {days} days since you worked on {name}"),
            );
        }

        if let Some(avg) = stats.average().filter(|avg| *avg < config.overall_struggle.threshold) {
            return gap(
                config.overall_struggle.below_threshold(avg),
                format!("Your overall {name} average is {avg:.1}/5"),
            );
        }

        None
    }

    fn progression(&self, skill: &str, candidate: &CandidateExercise, summary: &HistorySummary) -> Option<Scored> {
        let stats = summary.stats(skill);
        let avg = stats.average()?;
        let mastered = summary.max_difficulty.get(&skill_key(skill)).copied()?;
        let ready = stats.count >= self.config.mastery_min_reps && avg >= self.config.mastery_average;

        let next = mastered.checked_add(1)?;
        (ready && candidate.difficulty == next).then(|| Scored {
            tier: PriorityTier::DifficultyProgression,
            confidence: self.config.progression.above_threshold(avg),
            reason: format!(
                "You've mastered level {mastered} {} ({avg:.1}/5); time for level {}",
                skill_key(skill),
                candidate.difficulty
            ),
        })
    }

    fn success(&self, skill: &str, summary: &HistorySummary) -> Option<Scored> {
        let avg = summary.stats(skill).average().filter(|avg| *avg >= self.config.mastery_average)?;
        Some(Scored {
            tier: PriorityTier::SuccessPattern,
            confidence: self.config.success.above_threshold(avg),
            reason: format!("Builds on your strength in {} ({avg:.1}/5)", skill_key(skill)),
        })
    }

    fn difficulty_adjustment(&self, player_level: Option<u8>, difficulty: u8) -> f64 {
        match player_level.map(|level| level.abs_diff(difficulty)) {
            None => 0.0,
            Some(0) => self.config.difficulty_exact_bonus,
            Some(1) => self.config.difficulty_near_bonus,
            Some(_) => self.config.difficulty_far_penalty,
        }
    }
}
