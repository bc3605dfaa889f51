//! Canned requests and stage replies for generator integration tests

#![allow(dead_code)]

use serde_json::{json, Value};

use generator::{GeneratorConfig, ModelResponse};
use shared::{
    DrillRequirements, FieldSize, GenerationRequest, PlanGenerationRequest, PlayerProfile, SelectedWeakness,
};

pub fn drill_request() -> GenerationRequest {
    GenerationRequest {
        player_profile: Some(PlayerProfile {
            name: Some("Sam".into()),
            position: Some("midfielder".into()),
            experience_level: Some("intermediate".into()),
            ..Default::default()
        }),
        selected_weaknesses: vec![SelectedWeakness {
            category: "technical".into(),
            specific: "first touch under pressure".into(),
        }],
        requirements: DrillRequirements {
            equipment: vec!["ball".into(), "cones".into()],
            field_size: FieldSize::Small,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn plan_request() -> PlanGenerationRequest {
    PlanGenerationRequest {
        base: GenerationRequest {
            player_profile: Some(PlayerProfile::default()),
            skill_description: Some("build stamina for the full ninety".into()),
            ..Default::default()
        },
        duration_weeks: 2,
        target_role: Some("box-to-box midfielder".into()),
        focus_areas: vec!["endurance".into()],
        preferred_days: vec!["Tuesday".into()],
        rest_days: vec!["Sunday".into()],
    }
}

/// Fast settings: one retry, no backoff, short per-call timeout
pub fn fast_config() -> GeneratorConfig {
    GeneratorConfig {
        call_timeout_secs: 1,
        retry_attempts: 2,
        retry_backoff_ms: 0,
        ..Default::default()
    }
}

pub fn reply(value: Value) -> ModelResponse {
    ModelResponse::text(value.to_string())
}

pub fn scout_reply() -> ModelResponse {
    ModelResponse::text(format!(
        "Here is my analysis:\n```json\n{}\n```",
        json!({
            "primary_weakness": "first touch under pressure",
            "drill_archetype": "receive and turn",
            "difficulty_calibration": "maintain",
            "reasoning": "Touch ratings sit at 2 while passing is 4."
        })
    ))
}

pub fn coach_reply() -> ModelResponse {
    reply(json!({
        "pattern_type": "triangle",
        "equipment_placement": [
            {"type": "cone", "label": "A", "x": 2, "y": 2, "purpose": "start"},
            {"type": "cone", "label": "B", "x": 12, "y": 2, "purpose": "turn"},
            {"type": "player", "label": "P", "x": 1, "y": 1, "purpose": "player"}
        ],
        "movement_paths": [
            {"from": "A", "to": "B", "action": "dribble", "detail": "close control"},
            {"from": "B", "to": "A", "action": "pass", "detail": "firm pass back"}
        ],
        "weakness_address": "Forces a controlled first touch before every turn."
    }))
}

fn draft(paths: Value) -> Value {
    json!({
        "name": "Cone Turn Triangle",
        "description": "Receive and turn away from pressure.",
        "setup": "20x15m. Three cones. Start at A.",
        "instructions": [
            "Dribble from cone A to cone B keeping the ball close",
            "Turn sharply at cone B using the outside of the foot",
            "Pass firmly from cone B back to the start at cone A"
        ],
        "diagram": {
            "field": {"width": 20, "length": 15},
            "elements": [
                {"type": "cone", "x": 2, "y": 2, "label": "A"},
                {"type": "cone", "x": 12, "y": 2, "label": "B"},
                {"type": "player", "x": 1, "y": 1, "label": "P"}
            ],
            "paths": paths
        },
        "progressions": ["Easier: walk it", "Harder: add a defender"],
        "coachingPoints": ["Open body shape before receiving"],
        "estimatedDuration": 15,
        "difficulty": 3,
        "category": "technical",
        "targetSkills": ["first touch"],
        "equipment": ["ball", "cones"],
        "safetyNotes": "Clear the area."
    })
}

pub fn writer_reply() -> ModelResponse {
    reply(draft(json!([
        {"from": "A", "to": "B", "style": "dribble", "step": 1},
        {"from": "B", "to": "B", "style": "run", "step": 2},
        {"from": "B", "to": "A", "style": "pass", "step": 3}
    ])))
}

/// Three instructions but no path for step 2
pub fn writer_reply_missing_step() -> ModelResponse {
    reply(draft(json!([
        {"from": "A", "to": "B", "style": "dribble", "step": 1},
        {"from": "B", "to": "A", "style": "pass", "step": 3}
    ])))
}

pub fn referee_valid() -> ModelResponse {
    reply(json!({"verdict": "VALID", "errors": [], "score": 90}))
}

pub fn referee_errors() -> ModelResponse {
    reply(json!({
        "verdict": "ERRORS",
        "errors": [{"check": "clarity", "issue": "step 2 does not say which foot", "fix": "name the foot"}]
    }))
}

pub fn plan_value(weeks: u32) -> Value {
    const DAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];
    let weeks: Vec<Value> = (1..=weeks)
        .map(|n| {
            let days: Vec<Value> = DAYS
                .iter()
                .enumerate()
                .map(|(i, day)| {
                    let rest = *day == "Sunday";
                    let sessions = if rest {
                        json!([])
                    } else {
                        json!([{"session_type": "physical", "duration": 50, "intensity": 3, "suggested_exercise_names": ["Shuttle Runs", "Box Sprints"]}])
                    };
                    json!({"day_number": i + 1, "day_of_week": day, "is_rest_day": rest, "sessions": sessions})
                })
                .collect();
            json!({"week_number": n, "focus_area": "Aerobic base", "days": days})
        })
        .collect();

    json!({
        "name": "Ninety Minute Engine",
        "description": "Two weeks of aerobic work.",
        "category": "physical",
        "difficulty": 3,
        "duration_weeks": 2,
        "target_role": "box-to-box midfielder",
        "weeks": weeks
    })
}
