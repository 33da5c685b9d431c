//! # Authentication Middleware
//!
//! Every request except a CORS preflight must carry
//! `Authorization: Bearer <token>` where the token equals the configured API
//! key. The check runs before any routing decision, so unknown paths answer
//! `401` rather than `404` when unauthenticated.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{response::error_envelope, state::AppState};

pub const MISSING_HEADER_MESSAGE: &str = "Missing or invalid Authorization header";
pub const INVALID_KEY_MESSAGE: &str = "Invalid API key";

/// A custom rejection type for authentication failures.
#[derive(Debug)]
pub struct AuthError(StatusCode, String);

impl AuthError {
    fn missing_header() -> Self {
        AuthError(StatusCode::UNAUTHORIZED, MISSING_HEADER_MESSAGE.to_string())
    }

    fn invalid_key() -> Self {
        AuthError(StatusCode::UNAUTHORIZED, INVALID_KEY_MESSAGE.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_envelope(self.1, self.0).into_response()
    }
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is case-sensitive and must be followed by exactly one space and
/// at least one more character.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Rejects requests that do not present the configured API key.
pub async fn require_api_key(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| {
            warn!(path = %request.uri().path(), "Missing or malformed Authorization header");
            AuthError::missing_header()
        })?;

    // An empty configured key never matches: bearer_token rejects empty tokens.
    if token != app_state.config.api_key {
        warn!(path = %request.uri().path(), "Rejected request with an invalid API key");
        return Err(AuthError::invalid_key());
    }

    Ok(next.run(request).await)
}
