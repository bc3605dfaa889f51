//! Recommendation inputs and outputs

use serde::{Deserialize, Serialize};

use super::{check_scale, check_sessions, PlayerProfile, SessionSummary, SkillCategory};
use crate::errors::{SharedError, SharedResult};

/// Coarse bucket used as the primary sort key, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PriorityTier {
    SkillGap = 1,
    DifficultyProgression = 2,
    SuccessPattern = 3,
    Variety = 4,
}

impl From<PriorityTier> for u8 {
    fn from(tier: PriorityTier) -> Self {
        tier as u8
    }
}

impl TryFrom<u8> for PriorityTier {
    type Error = SharedError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PriorityTier::SkillGap),
            2 => Ok(PriorityTier::DifficultyProgression),
            3 => Ok(PriorityTier::SuccessPattern),
            4 => Ok(PriorityTier::Variety),
            other => Err(SharedError::UnknownVariant {
                kind: "priority tier",
                value: other.to_string(),
            }),
        }
    }
}

/// An exercise the scorer may recommend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateExercise {
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
    #[serde(default, alias = "targetSkills")]
    pub target_skills: Vec<String>,
    pub difficulty: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub exercise_id: String,
    pub exercise_name: String,
    pub reason: String,
    pub confidence: f64,
    pub priority_tier: PriorityTier,
    pub category: SkillCategory,
}

/// Body of a recommendation call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationRequest {
    pub player_profile: Option<PlayerProfile>,
    pub recent_sessions: Vec<SessionSummary>,
    pub candidates: Vec<CandidateExercise>,
    /// Seed for the variety jitter, so identical calls rank identically
    pub seed: Option<u64>,
}

impl RecommendationRequest {
    /// Every rating and difficulty, history and candidates alike, must sit on the 1 to 5 scale
    pub fn check_ranges(&self) -> SharedResult<()> {
        check_sessions(&self.recent_sessions)?;
        for (i, candidate) in self.candidates.iter().enumerate() {
            check_scale(format!("candidates[{i}].difficulty"), candidate.difficulty)?;
        }
        Ok(())
    }
}
