//! Generator-specific data types

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pipeline phase a model call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Scout,
    Coach,
    Writer,
    Referee,
    /// Single-stage training plan generation
    Plan,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scout => "scout",
            Stage::Coach => "coach",
            Stage::Writer => "writer",
            Stage::Referee => "referee",
            Stage::Plan => "plan",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat-completion call
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub stage: Stage,
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Model response data
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub model_used: String,
    pub response_time: Duration,
}

impl ModelResponse {
    /// Response carrying only text, as produced by fakes
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt_tokens: 0,
            completion_tokens: 0,
            model_used: String::new(),
            response_time: Duration::ZERO,
        }
    }

    pub fn tokens_used(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A problem the Referee found with a draft, plus how to fix it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeIssue {
    pub check: String,
    pub issue: String,
    #[serde(default)]
    pub fix: String,
}

impl RefereeIssue {
    pub fn new(check: impl Into<String>, issue: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            issue: issue.into(),
            fix: fix.into(),
        }
    }
}

impl fmt::Display for RefereeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fix.is_empty() {
            write!(f, "{}: {}", self.check, self.issue)
        } else {
            write!(f, "{}: {}. Fix: {}", self.check, self.issue, self.fix)
        }
    }
}
