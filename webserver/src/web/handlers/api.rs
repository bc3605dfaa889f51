//! REST API handlers
//!
//! Every POST route runs the same preamble: authenticate, parse the body,
//! then claim the cooldown slot for this user, route and body.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use recommender::aggregate;
use shared::logging::ServiceId;
use shared::{
    service_info, service_warn, GenerationRequest, PlanGenerationRequest, RecommendationRequest, SessionSummary,
    DO_NOT_REPEAT_LIMIT,
};

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;
use crate::types::{ArtifactRecord, DrillResponse, Identity, PlanResponse, RecommendationResponse, StoredArtifact};
use crate::web::auth::authenticate;

const SERVICE: ServiceId = ServiceId::WebServer;

const DRILL_ALGORITHM: &str = "agentic_pipeline_v2";
const PLAN_ALGORITHM: &str = "single_stage_plan_v1";

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> WebServerResult<T> {
    serde_json::from_slice(body).map_err(|e| WebServerError::MalformedJson { details: e.to_string() })
}

fn cooldown_key(user_id: &str, route: &str, body: &Bytes) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("{user_id}:{route}:{:016x}", hasher.finish())
}

/// Authenticate, parse and take the cooldown slot, returning the key so a
/// failed run can give it back
async fn admit<T: DeserializeOwned>(
    state: &AppState,
    headers: &HeaderMap,
    route: &str,
    body: &Bytes,
) -> WebServerResult<(Identity, T, String)> {
    let identity = authenticate(state, headers).await?;
    let request = parse_body(body)?;

    let key = cooldown_key(&identity.user_id, route, body);
    if let Err(left) = state.cooldown.try_acquire(key.clone()).await {
        let retry_after_secs = u64::try_from(left.num_seconds()).unwrap_or(0).max(1);
        service_warn!(SERVICE, user_id = %identity.user_id, route, retry_after_secs, "duplicate request inside cooldown");
        return Err(WebServerError::Cooldown { retry_after_secs });
    }

    Ok((identity, request, key))
}

/// Digest of the player's history handed to the Scout
fn history_summary(state: &AppState, sessions: &[SessionSummary]) -> String {
    let scoring = state.scorer.config();
    aggregate(sessions, state.clock.now(), &scoring.windows, scoring.max_sessions).describe()
}

/// Health check endpoint - GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Drill generation endpoint - POST /api/drills/generate
pub async fn generate_drill(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebServerResult<Json<DrillResponse>> {
    let (identity, mut request, key) = admit::<GenerationRequest>(&state, &headers, "drills", &body).await?;

    let result = run_drill(&state, &identity, &mut request).await;
    if result.is_err() {
        state.cooldown.release(&key).await;
    }
    result.map(Json)
}

async fn run_drill(state: &AppState, identity: &Identity, request: &mut GenerationRequest) -> WebServerResult<DrillResponse> {
    if !identity.is_anonymous() {
        let stored = state.store.recent_drill_names(&identity.user_id, DO_NOT_REPEAT_LIMIT).await?;
        request.merge_recent_artifact_names(stored);
    }

    let summary = history_summary(state, &request.recent_sessions);
    service_info!(SERVICE, user_id = %identity.user_id, sessions = request.recent_sessions.len(), "🎯 generating drill");

    let drill = state.drills.generate(request, Some(&summary)).await?;

    let generated_at = state.clock.now();
    let record = ArtifactRecord::new(identity.user_id.clone(), StoredArtifact::Drill(drill.clone()), generated_at);
    let id = record.id;
    state.store.upsert(record).await?;

    service_info!(SERVICE, user_id = %identity.user_id, drill = %drill.name, "✅ drill generated");
    Ok(DrillResponse {
        id,
        user_id: identity.user_id.clone(),
        drill,
        algorithm: DRILL_ALGORITHM.to_string(),
        generated_at,
        model_version: state.model_version.clone(),
        requirements: request.requirements.clone(),
    })
}

/// Training plan endpoint - POST /api/plans/generate
pub async fn generate_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebServerResult<Json<PlanResponse>> {
    let (identity, request, key) = admit::<PlanGenerationRequest>(&state, &headers, "plans", &body).await?;

    let result = run_plan(&state, &identity, &request).await;
    if result.is_err() {
        state.cooldown.release(&key).await;
    }
    result.map(Json)
}

async fn run_plan(state: &AppState, identity: &Identity, request: &PlanGenerationRequest) -> WebServerResult<PlanResponse> {
    let summary = history_summary(state, &request.base.recent_sessions);
    service_info!(SERVICE, user_id = %identity.user_id, weeks = request.duration_weeks, "📅 generating plan");

    let plan = state.plans.generate(request, Some(&summary)).await?;

    let generated_at = state.clock.now();
    let record = ArtifactRecord::new(identity.user_id.clone(), StoredArtifact::Plan(plan.clone()), generated_at);
    let id = record.id;
    state.store.upsert(record).await?;

    service_info!(SERVICE, user_id = %identity.user_id, plan = %plan.name, sessions = plan.session_count(), "✅ plan generated");
    Ok(PlanResponse {
        id,
        user_id: identity.user_id.clone(),
        plan,
        algorithm: PLAN_ALGORITHM.to_string(),
        generated_at,
        model_version: state.model_version.clone(),
    })
}

/// Recommendation endpoint - POST /api/recommendations
pub async fn recommend(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebServerResult<Json<RecommendationResponse>> {
    let (identity, request, key) = admit::<RecommendationRequest>(&state, &headers, "recommendations", &body).await?;

    if request.candidates.is_empty() {
        state.cooldown.release(&key).await;
        return Err(WebServerError::InvalidRequest {
            details: "candidates: at least one candidate exercise is required".to_string(),
        });
    }

    if let Err(err) = request.check_ranges() {
        state.cooldown.release(&key).await;
        return Err(WebServerError::InvalidRequest { details: err.to_string() });
    }

    let now = state.clock.now();
    let recommendations = state.scorer.recommend(&request, now);
    service_info!(
        SERVICE,
        user_id = %identity.user_id,
        candidates = request.candidates.len(),
        returned = recommendations.len(),
        "📋 recommendations ranked"
    );

    Ok(Json(RecommendationResponse {
        user_id: identity.user_id,
        recommendations,
        generated_at: now,
    }))
}
