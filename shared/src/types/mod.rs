//! Core types used throughout the service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SharedError;

pub mod drill;
pub mod plan;
pub mod profile;
pub mod recommendation;
pub mod request;
pub mod session;

pub use drill::*;
pub use plan::*;
pub use profile::*;
pub use recommendation::*;
pub use request::*;
pub use session::*;

/// Training categories accepted anywhere a category is named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    #[serde(alias = "Technical")]
    Technical,
    #[serde(alias = "Physical")]
    Physical,
    #[serde(alias = "Tactical")]
    Tactical,
    #[serde(alias = "Recovery")]
    Recovery,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 4] = [
        SkillCategory::Technical,
        SkillCategory::Physical,
        SkillCategory::Tactical,
        SkillCategory::Recovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "technical",
            SkillCategory::Physical => "physical",
            SkillCategory::Tactical => "tactical",
            SkillCategory::Recovery => "recovery",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(SkillCategory::Technical),
            "physical" => Ok(SkillCategory::Physical),
            "tactical" => Ok(SkillCategory::Tactical),
            "recovery" => Ok(SkillCategory::Recovery),
            _ => Err(SharedError::UnknownVariant {
                kind: "category",
                value: s.to_string(),
            }),
        }
    }
}

/// API failure reasons for text-generation model requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    /// Authentication failed (invalid API key)
    AuthenticationFailed,
    /// Rate limit exceeded
    RateLimitExceeded,
    /// Invalid request format or parameters
    InvalidRequest(String),
    /// Response arrived but its envelope was not what the API documents
    MalformedResponse(String),
    /// Network/connection error
    NetworkError(String),
    /// Server error from provider
    ServerError(String),
    /// Request timeout
    Timeout,
    /// Service temporarily unavailable
    ServiceUnavailable,
}

impl ApiFailure {
    /// Whether the same call may succeed if simply tried again
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiFailure::RateLimitExceeded
            | ApiFailure::MalformedResponse(_)
            | ApiFailure::NetworkError(_)
            | ApiFailure::ServerError(_)
            | ApiFailure::Timeout
            | ApiFailure::ServiceUnavailable => true,
            ApiFailure::AuthenticationFailed | ApiFailure::InvalidRequest(_) => false,
        }
    }

    /// Whether the failure suggests the model service itself is down
    /// (as opposed to a one-off bad response)
    pub fn indicates_outage(&self) -> bool {
        matches!(
            self,
            ApiFailure::NetworkError(_) | ApiFailure::Timeout | ApiFailure::ServiceUnavailable | ApiFailure::ServerError(_)
        )
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::AuthenticationFailed => write!(f, "authentication with the model service failed"),
            ApiFailure::RateLimitExceeded => write!(f, "model service rate limit exceeded"),
            ApiFailure::InvalidRequest(msg) => write!(f, "invalid model request: {msg}"),
            ApiFailure::MalformedResponse(msg) => write!(f, "malformed model response: {msg}"),
            ApiFailure::NetworkError(msg) => write!(f, "network error: {msg}"),
            ApiFailure::ServerError(msg) => write!(f, "model service error: {msg}"),
            ApiFailure::Timeout => write!(f, "model call timed out"),
            ApiFailure::ServiceUnavailable => write!(f, "model service unavailable"),
        }
    }
}
