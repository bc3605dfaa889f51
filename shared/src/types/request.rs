//! Inbound generation requests

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DrillFeedback, ExperienceLevel, FieldDimensions, PlayerProfile, SessionSummary};

/// How many recently generated names the Scout is told not to repeat
pub const DO_NOT_REPEAT_LIMIT: usize = 5;

/// Upper bound on history a request may carry
pub const MAX_RECENT_SESSIONS: usize = 30;

/// A weakness the player picked from the app's taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedWeakness {
    pub category: String,
    pub specific: String,
}

/// Playing area requested for a drill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FieldSize {
    /// Width by length in metres
    pub fn dimensions(&self) -> FieldDimensions {
        match self {
            FieldSize::Small => FieldDimensions { width: 20, length: 15 },
            FieldSize::Medium => FieldDimensions { width: 30, length: 20 },
            FieldSize::Large => FieldDimensions { width: 50, length: 30 },
        }
    }
}

/// Difficulty as the app sends it: either a 1–5 level or an experience label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DifficultyInput {
    Level(i64),
    Label(String),
}

impl DifficultyInput {
    /// Level on the 1–5 scale, `None` when out of range or unrecognised
    pub fn resolve(&self) -> Option<u8> {
        match self {
            DifficultyInput::Level(level) => u8::try_from(*level).ok().filter(|l| (1..=5).contains(l)),
            DifficultyInput::Label(label) => match label.trim().parse::<i64>() {
                Ok(level) => DifficultyInput::Level(level).resolve(),
                Err(_) => ExperienceLevel::from_label(label).map(|e| e.level()),
            },
        }
    }
}

/// Constraints the generated drill must respect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillRequirements {
    pub category: Option<String>,
    pub difficulty: Option<DifficultyInput>,
    pub equipment: Vec<String>,
    pub number_of_players: u32,
    pub field_size: FieldSize,
    pub skill_description: Option<String>,
}

impl Default for DrillRequirements {
    fn default() -> Self {
        Self {
            category: None,
            difficulty: None,
            equipment: Vec::new(),
            number_of_players: 1,
            field_size: FieldSize::default(),
            skill_description: None,
        }
    }
}

/// What the player is currently following, if anything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivePlanSnapshot {
    pub name: Option<String>,
    pub current_week: Option<u32>,
    pub total_weeks: Option<u32>,
    pub focus_area: Option<String>,
}

/// Everything a drill generation run may draw on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub player_profile: Option<PlayerProfile>,
    pub recent_sessions: Vec<SessionSummary>,
    pub category_balance: BTreeMap<String, f64>,
    pub active_plan: Option<ActivePlanSnapshot>,
    pub selected_weaknesses: Vec<SelectedWeakness>,
    pub skill_description: Option<String>,
    pub requirements: DrillRequirements,
    #[serde(alias = "do_not_repeat")]
    pub recent_artifact_names: Vec<String>,
    pub drill_feedback: Vec<DrillFeedback>,
}

impl GenerationRequest {
    /// Freeform description, preferring the top-level field over the one
    /// nested in the requirements
    pub fn freeform_text(&self) -> Option<&str> {
        self.skill_description
            .as_deref()
            .or(self.requirements.skill_description.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Merge stored names into the do-not-repeat list, newest first,
    /// keeping at most [`DO_NOT_REPEAT_LIMIT`] distinct entries
    pub fn merge_recent_artifact_names<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut merged: Vec<String> = Vec::with_capacity(DO_NOT_REPEAT_LIMIT);
        for name in self.recent_artifact_names.drain(..).chain(names) {
            if merged.len() == DO_NOT_REPEAT_LIMIT {
                break;
            }
            if !merged.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                merged.push(name);
            }
        }
        self.recent_artifact_names = merged;
    }
}

/// A plan request: the drill inputs plus scheduling constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanGenerationRequest {
    #[serde(flatten)]
    pub base: GenerationRequest,
    #[serde(default = "default_duration_weeks")]
    pub duration_weeks: u32,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub preferred_days: Vec<String>,
    #[serde(default)]
    pub rest_days: Vec<String>,
}

fn default_duration_weeks() -> u32 {
    6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_input_resolution() {
        assert_eq!(DifficultyInput::Level(3).resolve(), Some(3));
        assert_eq!(DifficultyInput::Level(0).resolve(), None);
        assert_eq!(DifficultyInput::Level(6).resolve(), None);
        assert_eq!(DifficultyInput::Label("Advanced".into()).resolve(), Some(4));
        assert_eq!(DifficultyInput::Label("2".into()).resolve(), Some(2));
        assert_eq!(DifficultyInput::Label("heroic".into()).resolve(), None);
    }

    #[test]
    fn test_field_sizes() {
        assert_eq!(FieldSize::Small.dimensions(), FieldDimensions { width: 20, length: 15 });
        assert_eq!(FieldSize::default().dimensions(), FieldDimensions { width: 30, length: 20 });
        assert_eq!(FieldSize::Large.dimensions(), FieldDimensions { width: 50, length: 30 });
    }

    #[test]
    fn test_merge_recent_names_dedupes_and_caps() {
        let mut request = GenerationRequest {
            recent_artifact_names: vec!["Gate Sprint".into(), "Wall Volley".into()],
            ..Default::default()
        };
        request.merge_recent_artifact_names(
            ["wall volley", "Cone Weave", "Box Rondo", "Touch Ladder", "Late Extra"]
                .into_iter()
                .map(String::from),
        );

        assert_eq!(
            request.recent_artifact_names,
            vec!["Gate Sprint", "Wall Volley", "Cone Weave", "Box Rondo", "Touch Ladder"]
        );
    }

    #[test]
    fn test_plan_request_defaults_and_flattening() {
        let json = r#"{"player_profile": {"age": 15}, "skill_description": "stamina for full matches", "rest_days": ["Sunday"]}"#;
        let request: PlanGenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.duration_weeks, 6);
        assert_eq!(request.base.freeform_text(), Some("stamina for full matches"));
        assert_eq!(request.base.requirements.number_of_players, 1);
        assert_eq!(request.rest_days, vec!["Sunday".to_string()]);
    }
}
