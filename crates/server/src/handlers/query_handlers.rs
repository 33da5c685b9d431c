//! # Query Route Handler
//!
//! `POST /query` runs caller-supplied SQL after it passes the SELECT-only
//! check. Validation happens before any session is opened.

use super::{AppError, AppState};
use crate::{
    response::{envelope, Envelope},
    types::{scalar_text, QueryRequest, QueryResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use sqlgate::{Identifier, ValidatedQuery};
use tracing::{info, warn};

pub const QUERY_PARAMS_REQUIRED: &str = "Database and query parameters are required";
pub const UNSAFE_QUERY: &str = "Invalid or unsafe query. Only SELECT queries are allowed.";

/// Handler for `POST /query` with body `{"database": ..., "query": ...}`.
pub async fn run_query_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Envelope<QueryResponse>, AppError> {
    let missing = || AppError::BadRequest(QUERY_PARAMS_REQUIRED.to_string());

    let Json(payload) = payload.map_err(|rejection| {
        warn!("Unreadable /query body: {rejection}");
        missing()
    })?;

    let database = payload
        .database
        .as_ref()
        .and_then(scalar_text)
        .ok_or_else(missing)?;
    let query = payload
        .query
        .as_ref()
        .and_then(scalar_text)
        .ok_or_else(missing)?;
    let database = Identifier::parse(&database).ok_or_else(missing)?;

    let query =
        ValidatedQuery::new(query).ok_or_else(|| AppError::BadRequest(UNSAFE_QUERY.to_string()))?;

    info!("Running caller query against '{database}'");
    let outcome = app_state.executor.run_query(&database, &query).await?;
    Ok(envelope(QueryResponse::from(outcome)))
}
