//! Player profile

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who the content is being generated for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub position: Option<String>,
    #[serde(alias = "experienceLevel")]
    pub experience_level: Option<String>,
    #[serde(alias = "skillGoals", alias = "goals")]
    pub skill_goals: Vec<String>,
    pub weaknesses: Vec<String>,
    #[serde(alias = "playingStyle")]
    pub playing_style: Option<String>,
    #[serde(alias = "matchPerformance")]
    pub match_performance: Option<MatchPerformance>,
}

impl PlayerProfile {
    /// Parsed experience level, `None` when absent or unrecognised
    pub fn experience(&self) -> Option<ExperienceLevel> {
        self.experience_level.as_deref().and_then(ExperienceLevel::from_label)
    }
}

/// Recent match observations reported alongside the profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPerformance {
    #[serde(alias = "matchCount")]
    pub match_count: u32,
    #[serde(alias = "recentWeaknesses")]
    pub recent_weaknesses: Vec<String>,
    #[serde(alias = "recentStrengths")]
    pub recent_strengths: Vec<String>,
}

/// Experience label from the app, mapped onto the 1–5 difficulty scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Professional,
}

impl ExperienceLevel {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            "expert" => Some(ExperienceLevel::Expert),
            "professional" | "pro" => Some(ExperienceLevel::Professional),
            _ => None,
        }
    }

    /// Position on the drill difficulty scale
    pub fn level(&self) -> u8 {
        match self {
            ExperienceLevel::Beginner => 1,
            ExperienceLevel::Intermediate => 3,
            ExperienceLevel::Advanced => 4,
            ExperienceLevel::Expert | ExperienceLevel::Professional => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
            ExperienceLevel::Expert => "expert",
            ExperienceLevel::Professional => "professional",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_levels_map_to_scale() {
        assert_eq!(ExperienceLevel::from_label("Beginner").map(|e| e.level()), Some(1));
        assert_eq!(ExperienceLevel::from_label("intermediate").map(|e| e.level()), Some(3));
        assert_eq!(ExperienceLevel::from_label("ADVANCED").map(|e| e.level()), Some(4));
        assert_eq!(ExperienceLevel::from_label("Expert").map(|e| e.level()), Some(5));
        assert_eq!(ExperienceLevel::from_label("Professional").map(|e| e.level()), Some(5));
        assert_eq!(ExperienceLevel::from_label("semi-pro"), None);
    }

    #[test]
    fn test_profile_accepts_app_field_names() {
        let json = r#"{"age": 16, "position": "midfielder", "experienceLevel": "Advanced", "skillGoals": ["first touch"]}"#;
        let profile: PlayerProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.experience(), Some(ExperienceLevel::Advanced));
        assert_eq!(profile.skill_goals, vec!["first touch".to_string()]);
    }
}
