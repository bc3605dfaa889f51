//! Bearer token authentication

use axum::http::{header, HeaderMap};

use shared::logging::ServiceId;
use shared::service_debug;

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;
use crate::types::Identity;

const SERVICE: ServiceId = ServiceId::WebServer;

/// Token from an `Authorization: Bearer <token>` header, if present
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the caller, falling back to the anonymous user when the server
/// allows unauthenticated access
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> WebServerResult<Identity> {
    let Some(token) = bearer_token(headers) else {
        if state.allow_unauthenticated {
            return Ok(Identity::anonymous());
        }
        return Err(WebServerError::unauthorized("Authentication required"));
    };

    let verified = match &state.verifier {
        Some(verifier) => verifier.verify(token).await,
        None => Err(WebServerError::unauthorized("Invalid authentication token")),
    };

    match verified {
        Ok(identity) => Ok(identity),
        Err(e) if state.allow_unauthenticated => {
            service_debug!(SERVICE, error = %e, "token rejected, continuing anonymously");
            Ok(Identity::anonymous())
        }
        Err(_) => Err(WebServerError::unauthorized("Invalid authentication token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer   xyz ")), Some("xyz"));
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
