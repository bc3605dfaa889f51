//! Bearer token verification against an HTTP identity endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use shared::logging::ServiceId;
use shared::service_debug;

use crate::error::{WebServerError, WebServerResult};
use crate::traits::TokenVerifier;
use crate::types::Identity;

const SERVICE: ServiceId = ServiceId::WebServer;

/// Asks an identity provider who owns a token.
///
/// The endpoint receives `GET <identity_url>` with the caller's bearer token
/// and answers 2xx with `{"uid": ...}` (or `user_id` / `sub`) when it is valid.
#[derive(Debug)]
pub struct HttpTokenVerifier {
    http: reqwest::Client,
    identity_url: Url,
}

impl HttpTokenVerifier {
    pub fn new(identity_url: &str, timeout: Duration) -> WebServerResult<Self> {
        let identity_url = Url::parse(identity_url)
            .map_err(|e| WebServerError::config(format!("invalid identity URL {identity_url}: {e}")))?;
        if !matches!(identity_url.scheme(), "http" | "https") {
            return Err(WebServerError::config(format!(
                "identity URL must be http(s), got {}",
                identity_url.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebServerError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, identity_url })
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> WebServerResult<Identity> {
        let response = self
            .http
            .get(self.identity_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                service_debug!(SERVICE, error = %e, "identity endpoint unreachable");
                WebServerError::unauthorized("Invalid authentication token")
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(WebServerError::unauthorized("Invalid authentication token"));
            }
            status => {
                service_debug!(SERVICE, status = status.as_u16(), "identity endpoint rejected lookup");
                return Err(WebServerError::unauthorized("Invalid authentication token"));
            }
        }

        let identity: Identity = response
            .json()
            .await
            .map_err(|_| WebServerError::unauthorized("Invalid authentication token"))?;
        if identity.user_id.trim().is_empty() {
            return Err(WebServerError::unauthorized("Invalid authentication token"));
        }
        Ok(identity)
    }
}
