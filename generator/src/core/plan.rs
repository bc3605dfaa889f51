//! Training plan generation: one model stage plus programmatic checks

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Weekday;
use serde_json::Value;
use tokio::sync::watch;

use shared::logging::ServiceId;
use shared::{
    service_info, service_warn, DifficultyInput, PlanGenerationRequest, ValidatedPlan, DAYS_PER_WEEK,
    MAX_SESSION_MINUTES, MIN_SESSION_MINUTES,
};

use crate::config::GeneratorConfig;
use crate::core::pipeline::{call_stage, cancelled};
use crate::core::prompt::{compose, PromptContext};
use crate::core::validator;
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::ModelClient;
use crate::types::{RefereeIssue, Stage};

const SERVICE: ServiceId = ServiceId::Generator;

/// Single-stage generator for multi-week training plans.
///
/// Each model draft is checked against the requested schedule; one failing
/// draft earns a revision call with the issues attached.
#[derive(Clone)]
pub struct PlanGenerator {
    client: Arc<dyn ModelClient>,
    config: GeneratorConfig,
}

impl PlanGenerator {
    pub fn new(client: Arc<dyn ModelClient>, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    pub async fn generate(&self, request: &PlanGenerationRequest, history_summary: Option<&str>) -> GeneratorResult<ValidatedPlan> {
        let (_keep_open, cancel) = watch::channel(false);
        self.generate_with_cancel(request, history_summary, cancel).await
    }

    /// Generate a plan. A plan failing the checks is regenerated once with
    /// the issues appended; a second failure is [`GeneratorError::GenerationFailed`].
    pub async fn generate_with_cancel(
        &self,
        request: &PlanGenerationRequest,
        history_summary: Option<&str>,
        mut cancel: watch::Receiver<bool>,
    ) -> GeneratorResult<ValidatedPlan> {
        validator::validate_plan(request)?;

        let budget = self.config.plan_budget();
        service_info!(SERVICE, weeks = request.duration_weeks, budget_secs = budget.as_secs(), "🏋️ starting plan generation");

        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => Err(GeneratorError::Cancelled),
            outcome = tokio::time::timeout(budget, self.run(request, history_summary)) => {
                outcome.map_err(|_| GeneratorError::Timeout { budget_secs: budget.as_secs() })?
            }
        }
    }

    async fn run(&self, request: &PlanGenerationRequest, history_summary: Option<&str>) -> GeneratorResult<ValidatedPlan> {
        let mut issues: Vec<RefereeIssue> = Vec::new();

        for generation in 1..=GeneratorConfig::PLAN_CALLS_PER_RUN {
            let context = PromptContext::for_plan(request).with_history(history_summary).with_revision(&issues);
            let prompt = compose(Stage::Plan, &context);
            let raw: Value = call_stage(self.client.as_ref(), &self.config, Stage::Plan, &prompt, Ok).await?;

            match check_plan(raw, request) {
                Ok(plan) => {
                    service_info!(SERVICE, name = %plan.name, sessions = plan.session_count(), "✅ plan accepted");
                    return Ok(plan);
                }
                Err(found) => {
                    service_warn!(SERVICE, generation, issues = found.len(), "plan failed checks");
                    issues = found;
                }
            }
        }

        Err(GeneratorError::GenerationFailed { issues })
    }
}

fn issue(check: &str, problem: impl Into<String>, fix: impl Into<String>) -> RefereeIssue {
    RefereeIssue::new(check, problem, fix)
}

/// Programmatic plan checks: shape, ranges, seven named days per week and
/// the requested rest days.
pub fn check_plan(mut raw: Value, request: &PlanGenerationRequest) -> Result<ValidatedPlan, Vec<RefereeIssue>> {
    if let Some(object) = raw.as_object_mut() {
        if let Some(label) = object.get("difficulty").and_then(Value::as_str) {
            if let Some(level) = DifficultyInput::Label(label.to_string()).resolve() {
                object.insert("difficulty".to_string(), Value::from(level));
            }
        }
        object
            .entry("duration_weeks")
            .or_insert_with(|| Value::from(request.duration_weeks));
    }

    let plan: ValidatedPlan = serde_json::from_value(raw).map_err(|e| {
        vec![issue("schema", format!("Plan does not match the required structure: {e}"), "Follow the JSON structure exactly")]
    })?;

    let mut issues = Vec::new();

    if !(1..=5).contains(&plan.difficulty) {
        issues.push(issue("range", format!("difficulty {} is outside 1-5", plan.difficulty), "Use a level from 1 to 5"));
    }
    if plan.duration_weeks != request.duration_weeks || plan.weeks.len() != request.duration_weeks as usize {
        issues.push(issue(
            "schedule",
            format!("Expected {} weeks, got {}", request.duration_weeks, plan.weeks.len()),
            format!("Return exactly {} weeks", request.duration_weeks),
        ));
    }

    let rest_days: HashSet<Weekday> = request
        .rest_days
        .iter()
        .filter_map(|d| d.trim().parse::<Weekday>().ok())
        .collect();

    for (index, week) in plan.weeks.iter().enumerate() {
        let expected_number = index as u32 + 1;
        if week.week_number != expected_number {
            issues.push(issue(
                "schedule",
                format!("Week at position {expected_number} is numbered {}", week.week_number),
                "Number weeks from 1 in order",
            ));
        }
        if week.days.len() != DAYS_PER_WEEK {
            issues.push(issue(
                "schedule",
                format!("Week {} has {} days", week.week_number, week.days.len()),
                "Include all 7 days Monday through Sunday",
            ));
        }

        let mut seen = HashSet::new();
        for day in &week.days {
            let Ok(weekday) = day.day_of_week.trim().parse::<Weekday>() else {
                issues.push(issue(
                    "schedule",
                    format!("Week {}: '{}' is not a weekday", week.week_number, day.day_of_week),
                    "Use full weekday names",
                ));
                continue;
            };
            if !seen.insert(weekday) {
                issues.push(issue(
                    "schedule",
                    format!("Week {} lists {} twice", week.week_number, day.day_of_week),
                    "List each weekday once",
                ));
            }
            if rest_days.contains(&weekday) && (!day.is_rest_day || !day.sessions.is_empty()) {
                issues.push(issue(
                    "rest",
                    format!("Week {}: {} must be a rest day", week.week_number, day.day_of_week),
                    "Set is_rest_day to true with no sessions",
                ));
            }
            if day.is_rest_day && !day.sessions.is_empty() {
                issues.push(issue(
                    "rest",
                    format!("Week {}: rest day {} has sessions", week.week_number, day.day_of_week),
                    "Remove sessions from rest days",
                ));
            }
            for session in &day.sessions {
                if !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&session.duration) {
                    issues.push(issue(
                        "range",
                        format!("Week {} {}: session lasts {} minutes", week.week_number, day.day_of_week, session.duration),
                        format!("Keep sessions between {MIN_SESSION_MINUTES} and {MAX_SESSION_MINUTES} minutes"),
                    ));
                }
                if !(1..=5).contains(&session.intensity) {
                    issues.push(issue(
                        "range",
                        format!("Week {} {}: intensity {}", week.week_number, day.day_of_week, session.intensity),
                        "Use intensity 1 to 5",
                    ));
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(plan)
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::{GenerationRequest, PlayerProfile, SkillCategory};

    const DAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

    fn request(weeks: u32) -> PlanGenerationRequest {
        PlanGenerationRequest {
            base: GenerationRequest {
                player_profile: Some(PlayerProfile::default()),
                skill_description: Some("stamina for full matches".into()),
                ..Default::default()
            },
            duration_weeks: weeks,
            target_role: None,
            focus_areas: Vec::new(),
            preferred_days: Vec::new(),
            rest_days: vec!["Sunday".into()],
        }
    }

    fn plan_json(weeks: u32) -> Value {
        let weeks: Vec<Value> = (1..=weeks)
            .map(|n| {
                let days: Vec<Value> = DAYS
                    .iter()
                    .enumerate()
                    .map(|(i, day)| {
                        let rest = *day == "Sunday";
                        json!({
                            "day_number": i + 1,
                            "day_of_week": day,
                            "is_rest_day": rest,
                            "sessions": if rest { json!([]) } else {
                                json!([{"session_type": "Physical", "duration": 45, "intensity": 3, "suggested_exercise_names": ["Sprints", "Interval Run"]}])
                            }
                        })
                    })
                    .collect();
                json!({"week_number": n, "focus_area": "Base", "days": days})
            })
            .collect();
        json!({
            "name": "Engine Room",
            "description": "Builds match stamina.",
            "category": "Physical",
            "difficulty": "Intermediate",
            "weeks": weeks
        })
    }

    #[test]
    fn test_accepts_complete_plan() {
        let plan = check_plan(plan_json(2), &request(2)).unwrap();
        assert_eq!(plan.difficulty, 3);
        assert_eq!(plan.category, SkillCategory::Physical);
        assert_eq!(plan.duration_weeks, 2);
        assert_eq!(plan.session_count(), 12);
    }

    #[test]
    fn test_rejects_training_on_rest_day() {
        let mut raw = plan_json(1);
        raw["weeks"][0]["days"][6]["is_rest_day"] = json!(false);
        let issues = check_plan(raw, &request(1)).unwrap_err();
        assert!(issues.iter().any(|i| i.check == "rest"));
    }

    #[test]
    fn test_rejects_wrong_week_count_and_ranges() {
        let mut raw = plan_json(1);
        raw["weeks"][0]["days"][0]["sessions"][0]["duration"] = json!(120);
        raw["weeks"][0]["days"][1]["sessions"][0]["intensity"] = json!(0);
        let issues = check_plan(raw, &request(3)).unwrap_err();
        let checks: Vec<&str> = issues.iter().map(|i| i.check.as_str()).collect();
        assert!(checks.contains(&"schedule"));
        assert_eq!(checks.iter().filter(|c| **c == "range").count(), 2);
    }

    #[test]
    fn test_rejects_missing_day() {
        let mut raw = plan_json(1);
        raw["weeks"][0]["days"].as_array_mut().unwrap().remove(2);
        let issues = check_plan(raw, &request(1)).unwrap_err();
        assert!(issues.iter().any(|i| i.issue.contains("6 days")));
    }
}
