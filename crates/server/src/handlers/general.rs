//! # General Route Handlers
//!
//! CORS preflight and the JSON fallback for unmatched routes.

use crate::response::error_envelope;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

/// Answers `OPTIONS` with an empty `200 OK`. The CORS headers are added by
/// the router's outer layers.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unmatched routes. Preflights still succeed here so that
/// `OPTIONS` is answered on any path.
pub async fn not_found_handler(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    error_envelope("Not found", StatusCode::NOT_FOUND).into_response()
}
