//! WebServer-specific error types and their HTTP mapping

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use generator::GeneratorError;
use shared::logging::ServiceId;
use shared::{service_error, service_warn};

pub type WebServerResult<T> = Result<T, WebServerError>;

const SERVICE: ServiceId = ServiceId::WebServer;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("Invalid JSON: {details}")]
    MalformedJson { details: String },

    #[error("{reason}")]
    Unauthorized { reason: String },

    #[error("Identical request received too recently; retry in {retry_after_secs}s")]
    Cooldown { retry_after_secs: u64 },

    #[error(transparent)]
    Generation(#[from] GeneratorError),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WebServerError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        WebServerError::Unauthorized { reason: reason.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        WebServerError::Config { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebServerError::InvalidRequest { .. } | WebServerError::MalformedJson { .. } => StatusCode::BAD_REQUEST,
            WebServerError::Generation(GeneratorError::Validation(_)) => StatusCode::BAD_REQUEST,
            WebServerError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            WebServerError::Cooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable bucket name clients can switch on
    pub fn kind(&self) -> &'static str {
        match self {
            WebServerError::InvalidRequest { .. } => "validation",
            WebServerError::MalformedJson { .. } => "malformed_request",
            WebServerError::Unauthorized { .. } => "auth",
            WebServerError::Cooldown { .. } => "cooldown",
            WebServerError::Generation(err) => match err {
                GeneratorError::Validation(_) => "validation",
                GeneratorError::GenerationFailed { .. } => "generation_failed",
                GeneratorError::Pipeline { service_unavailable: true, .. } => "service_unavailable",
                GeneratorError::TransientCall { .. } | GeneratorError::Parse { .. } | GeneratorError::Pipeline { .. } => {
                    "pipeline"
                }
                GeneratorError::Timeout { .. } => "timeout",
                GeneratorError::Cancelled => "cancelled",
                GeneratorError::InvalidTransition { .. } | GeneratorError::Config { .. } => "internal",
            },
            WebServerError::Storage { .. } => "storage",
            WebServerError::Config { .. } => "internal",
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            service_error!(SERVICE, kind, error = %self, "❌ request failed");
        } else {
            service_warn!(SERVICE, kind, error = %self, "request rejected");
        }

        let mut body = json!({ "error": self.to_string(), "kind": kind });
        if let WebServerError::Generation(GeneratorError::GenerationFailed { issues }) = &self {
            body["issues"] = json!(issues);
        }

        let mut response = (status, Json(body)).into_response();
        if let WebServerError::Cooldown { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generator::ValidationError;
    use shared::ApiFailure;

    #[test]
    fn test_status_and_kind_buckets() {
        let validation = WebServerError::from(GeneratorError::Validation(ValidationError::new("player_profile", "is required")));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.kind(), "validation");

        let outage = WebServerError::from(GeneratorError::Pipeline {
            stage: generator::Stage::Writer,
            attempts: 2,
            service_unavailable: true,
        });
        assert_eq!(outage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outage.kind(), "service_unavailable");

        let transient = WebServerError::from(GeneratorError::TransientCall {
            stage: generator::Stage::Scout,
            reason: ApiFailure::RateLimitExceeded,
        });
        assert_eq!(transient.kind(), "pipeline");

        assert_eq!(WebServerError::Cooldown { retry_after_secs: 3 }.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(WebServerError::unauthorized("Authentication required").status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_cooldown_sets_retry_after() {
        let response = WebServerError::Cooldown { retry_after_secs: 12 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
