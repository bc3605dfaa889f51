//! WebServer-specific types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::{DrillRequirements, Recommendation, ValidatedDrill, ValidatedPlan};

/// User id requests run under when authentication is optional
pub const ANONYMOUS_USER: &str = "anonymous";

/// The caller behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(alias = "uid", alias = "sub")]
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USER)
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id == ANONYMOUS_USER
    }
}

/// Which generated artifact a record holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum StoredArtifact {
    Drill(ValidatedDrill),
    Plan(ValidatedPlan),
}

impl StoredArtifact {
    pub fn name(&self) -> &str {
        match self {
            StoredArtifact::Drill(drill) => &drill.name,
            StoredArtifact::Plan(plan) => &plan.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub artifact: StoredArtifact,
}

impl ArtifactRecord {
    pub fn new(user_id: impl Into<String>, artifact: StoredArtifact, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            created_at,
            artifact,
        }
    }
}

/// Body returned by the drill route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillResponse {
    pub id: Uuid,
    pub user_id: String,
    pub drill: ValidatedDrill,
    pub algorithm: String,
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
    pub requirements: DrillRequirements,
}

/// Body returned by the plan route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub user_id: String,
    pub plan: ValidatedPlan,
    pub algorithm: String,
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
}

/// Body returned by the recommendation route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: String,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_accepts_provider_field_names() {
        let identity: Identity = serde_json::from_str(r#"{"uid": "u-17"}"#).unwrap();
        assert_eq!(identity, Identity::new("u-17"));
        let identity: Identity = serde_json::from_str(r#"{"sub": "u-18"}"#).unwrap();
        assert_eq!(identity.user_id, "u-18");
        assert!(Identity::anonymous().is_anonymous());
    }
}
