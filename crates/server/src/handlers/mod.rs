//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `sqlgate-server`.
//! The handlers are split into logical sub-modules: catalog and table reads
//! (`db_handlers`), caller-supplied SQL (`query_handlers`), and the preflight
//! and fallback responses (`general`).

pub mod db_handlers;
pub mod general;
pub mod query_handlers;

// Re-export all handlers so the router can reach them under `handlers::`.
pub use db_handlers::*;
pub use general::*;
pub use query_handlers::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
use sqlgate::Identifier;

/// Sanitizes a request parameter, treating absent and sanitized-to-empty
/// values alike.
pub(crate) fn required_identifier(raw: Option<&str>) -> Option<Identifier> {
    raw.and_then(Identifier::parse)
}

/// Both identifiers, or `BadRequest(message)` if either is missing.
pub(crate) fn required_pair(
    first: Option<&str>,
    second: Option<&str>,
    message: &str,
) -> Result<(Identifier, Identifier), AppError> {
    match (required_identifier(first), required_identifier(second)) {
        (Some(first), Some(second)) => Ok((first, second)),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}
