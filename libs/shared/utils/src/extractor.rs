use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
    body::Body,
};
use sha2::{Digest, Sha256};
use tracing::debug;

use shared_models::error::AppError;
use shared_config::AppConfig;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";
pub const VAPI_SECRET_HEADER: &str = "x-vapi-secret";

/// Rejects webhook calls that do not present the configured shared secret.
/// With no secret configured every request passes.
pub async fn webhook_secret_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = config.webhook_secret.as_deref() {
        let presented = extract_secret(request.headers())
            .ok_or_else(|| AppError::Auth("Missing webhook secret".to_string()))?;

        if !secrets_match(presented, expected) {
            debug!("Webhook secret mismatch for {}", request.uri().path());
            return Err(AppError::Auth("Invalid webhook secret".to_string()));
        }
    }

    Ok(next.run(request).await)
}

pub fn extract_secret(headers: &HeaderMap) -> Option<&str> {
    [WEBHOOK_SECRET_HEADER, VAPI_SECRET_HEADER]
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
}

/// Compares digests so the comparison cost does not depend on where the
/// inputs first differ.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn secrets_compare_exactly() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cret "));
        assert!(!secrets_match("", "s3cret"));
    }

    #[test]
    fn either_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(VAPI_SECRET_HEADER, HeaderValue::from_static("abc"));
        assert_eq!(extract_secret(&headers), Some("abc"));

        headers.insert(WEBHOOK_SECRET_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(extract_secret(&headers), Some("xyz"));
    }
}
