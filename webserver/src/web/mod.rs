//! Router assembly

pub mod auth;
pub mod handlers;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// CORS policy applied to every response, errors included
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/drills/generate", post(handlers::generate_drill))
        .route("/api/plans/generate", post(handlers::generate_plan))
        .route("/api/recommendations", post(handlers::recommend))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
