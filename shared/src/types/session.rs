//! Training history as reported by the app

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SkillCategory;
use crate::errors::{SharedError, SharedResult};

/// Ratings and difficulties share the app's 1 to 5 scale
pub const MIN_SCALE: u8 = 1;
pub const MAX_SCALE: u8 = 5;

/// One completed training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub date: DateTime<Utc>,
    #[serde(alias = "duration")]
    pub duration_minutes: u32,
    #[serde(alias = "overallRating")]
    pub overall_rating: u8,
    #[serde(default)]
    pub exercises: Vec<ExerciseRecord>,
}

/// An exercise performed inside a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    #[serde(alias = "id", alias = "exerciseId")]
    pub exercise_id: String,
    pub name: String,
    pub category: SkillCategory,
    #[serde(default, alias = "targetSkills", alias = "skills")]
    pub target_skills: Vec<String>,
    #[serde(alias = "rating", alias = "performanceRating")]
    pub performance_rating: u8,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_difficulty() -> u8 {
    3
}

/// Fails on the first value outside the 1 to 5 scale
pub fn check_scale(field: impl Into<String>, value: u8) -> SharedResult<()> {
    if (MIN_SCALE..=MAX_SCALE).contains(&value) {
        return Ok(());
    }
    Err(SharedError::OutOfRange {
        field: field.into(),
        value: i64::from(value),
        min: i64::from(MIN_SCALE),
        max: i64::from(MAX_SCALE),
    })
}

/// Check every rating and difficulty in a training history
pub fn check_sessions(sessions: &[SessionSummary]) -> SharedResult<()> {
    for (i, session) in sessions.iter().enumerate() {
        check_scale(format!("recent_sessions[{i}].overall_rating"), session.overall_rating)?;
        for (j, exercise) in session.exercises.iter().enumerate() {
            let prefix = format!("recent_sessions[{i}].exercises[{j}]");
            check_scale(format!("{prefix}.performance_rating"), exercise.performance_rating)?;
            check_scale(format!("{prefix}.difficulty"), exercise.difficulty)?;
        }
    }
    Ok(())
}

/// Player reaction to a previously generated drill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillFeedback {
    #[serde(alias = "drillName")]
    pub drill_name: Option<String>,
    pub rating: u8,
    #[serde(alias = "difficultyFeedback")]
    pub difficulty_feedback: Option<String>,
    #[serde(alias = "feedbackType")]
    pub feedback_type: Option<String>,
    pub notes: Option<String>,
}
