//! Chat-completions client for the hosted text-generation model

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use shared::ApiFailure;

use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::ModelClient;
use crate::types::{ModelRequest, ModelResponse};

/// Real implementation of ModelClient over an OpenAI-compatible API
#[derive(Clone)]
pub struct RealModelClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RealModelClient {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> GeneratorResult<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| GeneratorError::Config {
            message: format!("base_url '{base_url}' is not a valid URL: {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GeneratorError::Config {
                message: format!("base_url '{base_url}' must use http or https"),
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn map_status(status: reqwest::StatusCode) -> ApiFailure {
    match status.as_u16() {
        401 | 403 => ApiFailure::AuthenticationFailed,
        429 => ApiFailure::RateLimitExceeded,
        503 => ApiFailure::ServiceUnavailable,
        400 | 404 | 422 => ApiFailure::InvalidRequest(status.to_string()),
        _ => ApiFailure::ServerError(status.to_string()),
    }
}

fn usage_field(usage: Option<&Value>, key: &str) -> u32 {
    usage
        .and_then(|u| u.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

#[async_trait]
impl ModelClient for RealModelClient {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ApiFailure> {
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "model": request.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user}
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiFailure::Timeout
                } else {
                    ApiFailure::NetworkError(e.to_string())
                }
            })?;

        let response_time = request_start.elapsed();

        if !response.status().is_success() {
            return Err(map_status(response.status()));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ApiFailure::MalformedResponse(format!("body is not JSON: {e}")))?;

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| ApiFailure::MalformedResponse("no content in response".to_string()))?;

        let usage = response_json.get("usage");
        let model_used = response_json
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(&request.model)
            .to_string();

        Ok(ModelResponse {
            content: content.to_string(),
            prompt_tokens: usage_field(usage, "prompt_tokens"),
            completion_tokens: usage_field(usage, "completion_tokens"),
            model_used,
            response_time,
        })
    }
}
