use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get("authorization")?.to_str().ok()?;
    auth_header.strip_prefix("Bearer ")
}

/// Compare digests so the comparison time does not depend on the shared prefix.
fn tokens_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Only the authentication middleware holding `BRIDGE_TOKEN` may call through.
pub async fn require_bridge_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.bridge_token.as_deref() else {
        return AppError::BridgeDisabled.into_response();
    };

    match extract_bearer_token(&headers) {
        Some(presented) if tokens_match(presented, expected) => next.run(request).await,
        _ => {
            tracing::warn!(
                path = %request.uri().path(),
                "Rejected request with missing or invalid bridge token"
            );
            AppError::AuthenticationFailed.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer s3cret"));
        assert_eq!(extract_bearer_token(&headers), Some("s3cret"));
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("s3cret", "s3cret"));
        assert!(!tokens_match("s3cre", "s3cret"));
        assert!(!tokens_match("", "s3cret"));
    }
}
