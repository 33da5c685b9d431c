//! # Database Route Handlers
//!
//! Catalog listings, column metadata, and paginated table reads.

use super::{required_identifier, required_pair, AppError, AppState};
use crate::{
    response::{envelope, Envelope},
    types::{
        DataParams, DataResponse, DatabasesResponse, SchemaParams, SchemaResponse, TablesParams,
        TablesResponse,
    },
};
use axum::extract::{rejection::QueryRejection, Query, State};
use sqlgate::Pagination;
use tracing::{info, warn};

const DATABASE_PARAM_REQUIRED: &str = "Database parameter is required";
const TABLE_PARAMS_REQUIRED: &str = "Database and table parameters are required";

// An unreadable query string (e.g. a repeated key) counts as a missing parameter.
fn read_params<T>(params: Result<Query<T>, QueryRejection>, message: &str) -> Result<T, AppError> {
    params.map(|Query(params)| params).map_err(|rejection| {
        warn!("Unreadable query string: {rejection}");
        AppError::BadRequest(message.to_string())
    })
}

/// Handler for `GET /databases`.
pub async fn list_databases_handler(
    State(app_state): State<AppState>,
) -> Result<Envelope<DatabasesResponse>, AppError> {
    let databases = app_state.executor.list_databases().await?;
    info!("Listed {} databases", databases.len());
    Ok(envelope(DatabasesResponse { databases }))
}

/// Handler for `GET /tables?database=`.
pub async fn list_tables_handler(
    State(app_state): State<AppState>,
    params: Result<Query<TablesParams>, QueryRejection>,
) -> Result<Envelope<TablesResponse>, AppError> {
    let params = read_params(params, DATABASE_PARAM_REQUIRED)?;
    let database = required_identifier(params.database.as_deref())
        .ok_or_else(|| AppError::BadRequest(DATABASE_PARAM_REQUIRED.to_string()))?;

    let tables = app_state.executor.list_tables(&database).await?;
    info!("Listed {} tables in '{database}'", tables.len());
    Ok(envelope(TablesResponse { tables }))
}

/// Handler for `GET /schema?database=&table=`.
///
/// An unknown database or table yields an empty `schema` list.
pub async fn describe_schema_handler(
    State(app_state): State<AppState>,
    params: Result<Query<SchemaParams>, QueryRejection>,
) -> Result<Envelope<SchemaResponse>, AppError> {
    let params = read_params(params, TABLE_PARAMS_REQUIRED)?;
    let (database, table) = required_pair(
        params.database.as_deref(),
        params.table.as_deref(),
        TABLE_PARAMS_REQUIRED,
    )?;

    let schema = app_state.executor.describe_schema(&database, &table).await?;
    Ok(envelope(SchemaResponse { schema }))
}

/// Handler for `GET /data?database=&table=&limit=&offset=`.
pub async fn fetch_data_handler(
    State(app_state): State<AppState>,
    params: Result<Query<DataParams>, QueryRejection>,
) -> Result<Envelope<DataResponse>, AppError> {
    let params = read_params(params, TABLE_PARAMS_REQUIRED)?;
    let (database, table) = required_pair(
        params.database.as_deref(),
        params.table.as_deref(),
        TABLE_PARAMS_REQUIRED,
    )?;
    let pagination = Pagination::from_params(params.limit.as_deref(), params.offset.as_deref());

    let page = app_state
        .executor
        .fetch_page(&database, &table, pagination)
        .await?;
    info!(
        "Read {} of {} rows from '{database}'.'{table}'",
        page.rows.len(),
        page.total_count
    );
    Ok(envelope(DataResponse::new(page, pagination)))
}
