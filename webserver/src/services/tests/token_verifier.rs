//! Tests for HttpTokenVerifier against a mock identity endpoint

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::WebServerError;
use crate::services::HttpTokenVerifier;
use crate::traits::TokenVerifier;

async fn verifier_for(server: &MockServer) -> HttpTokenVerifier {
    HttpTokenVerifier::new(&format!("{}/v1/me", server.uri()), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_valid_token_resolves_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(bearer_token("good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uid": "player-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let identity = verifier_for(&server).await.verify("good-token").await.unwrap();
    assert_eq!(identity.user_id, "player-9");
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = verifier_for(&server).await.verify("bad-token").await.unwrap_err();
    assert_matches!(err, WebServerError::Unauthorized { reason } if reason == "Invalid authentication token");
}

#[tokio::test]
async fn test_unexpected_body_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let err = verifier_for(&server).await.verify("token").await.unwrap_err();
    assert_matches!(err, WebServerError::Unauthorized { .. });
}

#[test]
fn test_rejects_non_http_identity_url() {
    assert_matches!(
        HttpTokenVerifier::new("ftp://identity.local/me", Duration::from_secs(1)),
        Err(WebServerError::Config { .. })
    );
    assert_matches!(
        HttpTokenVerifier::new("not a url", Duration::from_secs(1)),
        Err(WebServerError::Config { .. })
    );
}
