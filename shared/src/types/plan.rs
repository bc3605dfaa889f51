//! Multi-week training plan artifact

use serde::{Deserialize, Serialize};

use super::SkillCategory;

pub const DAYS_PER_WEEK: usize = 7;
pub const MIN_SESSION_MINUTES: u32 = 30;
pub const MAX_SESSION_MINUTES: u32 = 90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSession {
    pub session_type: SkillCategory,
    /// Minutes
    pub duration: u32,
    pub intensity: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub suggested_exercise_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub day_number: u32,
    pub day_of_week: String,
    pub is_rest_day: bool,
    #[serde(default)]
    pub sessions: Vec<PlanSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWeek {
    pub week_number: u32,
    pub focus_area: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub days: Vec<PlanDay>,
}

/// A plan that passed every check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPlan {
    pub name: String,
    pub description: String,
    pub category: SkillCategory,
    pub difficulty: u8,
    pub duration_weeks: u32,
    #[serde(default)]
    pub target_role: Option<String>,
    pub weeks: Vec<PlanWeek>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub target_skills: Vec<String>,
}

impl ValidatedPlan {
    pub fn session_count(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .map(|d| d.sessions.len())
            .sum()
    }
}
