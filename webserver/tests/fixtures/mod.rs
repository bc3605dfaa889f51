//! Shared state builders, canned model replies and request helpers for
//! router tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};

use generator::{GeneratorConfig, MockModelClient, ModelRequest, ModelResponse, Stage};
use shared::{DrillDiagram, FieldDimensions, FixedClock, SkillCategory, ValidatedDrill};
use webserver::traits::MockTokenVerifier;
use webserver::{AppState, Identity, InMemoryArtifactStore, WebServerError};

pub const GOOD_TOKEN: &str = "good-token";
pub const USER_ID: &str = "player-1";

pub fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 15, 9, 0, 0).unwrap()
}

pub fn fast_config() -> GeneratorConfig {
    GeneratorConfig {
        call_timeout_secs: 1,
        retry_attempts: 2,
        retry_backoff_ms: 0,
        ..Default::default()
    }
}

/// Accepts only [`GOOD_TOKEN`], as [`USER_ID`]
pub fn verifier() -> MockTokenVerifier {
    let mut verifier = MockTokenVerifier::new();
    verifier.expect_verify().returning(|token| {
        if token == GOOD_TOKEN {
            Ok(Identity::new(USER_ID))
        } else {
            Err(WebServerError::unauthorized("Invalid authentication token"))
        }
    });
    verifier
}

pub fn state(client: MockModelClient, store: Arc<InMemoryArtifactStore>) -> AppState {
    AppState::new(Arc::new(client), fast_config(), store)
        .with_verifier(Arc::new(verifier()))
        .with_clock(Arc::new(FixedClock::at(now())), Duration::seconds(30))
}

pub fn expect_stage(mock: &mut MockModelClient, stage: Stage, times: usize, response: fn() -> ModelResponse) {
    mock.expect_complete()
        .withf(move |request: &ModelRequest| request.stage == stage)
        .times(times)
        .returning(move |_| Ok(response()));
}

/// Mock answering one clean drill run per `runs`
pub fn drill_client(runs: usize) -> MockModelClient {
    let mut mock = MockModelClient::new();
    expect_stage(&mut mock, Stage::Scout, runs, scout_reply);
    expect_stage(&mut mock, Stage::Coach, runs, coach_reply);
    expect_stage(&mut mock, Stage::Writer, runs, writer_reply);
    expect_stage(&mut mock, Stage::Referee, runs, referee_valid);
    mock
}

/// Mock that fails the test if anything reaches the model
pub fn silent_client() -> MockModelClient {
    let mut mock = MockModelClient::new();
    mock.expect_complete().times(0);
    mock
}

pub fn scout_reply() -> ModelResponse {
    ModelResponse::text(
        json!({
            "primary_weakness": "first touch under pressure",
            "drill_archetype": "receive and turn",
            "difficulty_calibration": "maintain",
            "reasoning": "Touch ratings trail passing."
        })
        .to_string(),
    )
}

pub fn coach_reply() -> ModelResponse {
    ModelResponse::text(
        json!({
            "pattern_type": "linear",
            "equipment_placement": [
                {"type": "cone", "label": "A", "x": 2, "y": 2, "purpose": "start"},
                {"type": "cone", "label": "B", "x": 12, "y": 2, "purpose": "turn"}
            ],
            "movement_paths": [{"from": "A", "to": "B", "action": "dribble", "detail": "close control"}],
            "weakness_address": "Controlled touch before every turn."
        })
        .to_string(),
    )
}

pub fn writer_reply() -> ModelResponse {
    ModelResponse::text(
        json!({
            "name": "Cone Turn Line",
            "description": "Receive and turn away from pressure.",
            "setup": "20x15m. Two cones.",
            "instructions": [
                "Dribble from cone A to cone B keeping the ball close",
                "Pass firmly from cone B back to cone A"
            ],
            "diagram": {
                "field": {"width": 20, "length": 15},
                "elements": [
                    {"type": "cone", "x": 2, "y": 2, "label": "A"},
                    {"type": "cone", "x": 12, "y": 2, "label": "B"}
                ],
                "paths": [
                    {"from": "A", "to": "B", "style": "dribble", "step": 1},
                    {"from": "B", "to": "A", "style": "pass", "step": 2}
                ]
            },
            "progressions": ["Harder: add a defender"],
            "coachingPoints": ["Open body shape"],
            "estimatedDuration": 15,
            "difficulty": 3,
            "category": "technical",
            "targetSkills": ["first touch"],
            "equipment": ["ball", "cones"]
        })
        .to_string(),
    )
}

pub fn referee_valid() -> ModelResponse {
    ModelResponse::text(json!({"verdict": "VALID", "errors": [], "score": 88}).to_string())
}

/// A drill as a previous run would have stored it
pub fn stored_drill(name: &str) -> ValidatedDrill {
    ValidatedDrill {
        name: name.to_string(),
        description: "Volley against a wall".to_string(),
        setup: "Stand 5m from a wall".to_string(),
        category: SkillCategory::Technical,
        difficulty: 2,
        estimated_duration: 10,
        instructions: vec!["Volley the ball against the wall".to_string()],
        equipment: vec!["ball".to_string()],
        target_skills: vec!["volleying".to_string()],
        progressions: Vec::new(),
        coaching_points: Vec::new(),
        safety_notes: None,
        diagram: DrillDiagram {
            field: FieldDimensions { width: 20, length: 15 },
            elements: Vec::new(),
            paths: Vec::new(),
        },
    }
}

pub fn drill_body() -> Value {
    json!({
        "player_profile": {"age": 15, "position": "midfielder", "experienceLevel": "intermediate"},
        "selected_weaknesses": [{"category": "technical", "specific": "first touch"}],
        "requirements": {"equipment": ["ball", "cones"], "field_size": "small"}
    })
}

pub fn post(uri: &str, token: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::ORIGIN, "https://app.example")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.into()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    post(uri, token, body.to_string())
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
