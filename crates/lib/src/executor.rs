//! # The Statement Executor
//!
//! This module defines the `StatementExecutor`, the entry point the server
//! calls for every database-backed operation. Each public method opens its
//! own read-only session, runs one operation, and closes the session again
//! before returning, whatever the outcome.
//!
//! The operations themselves are plain functions over `&mut dyn Session` so
//! they can be driven directly by a scripted session in tests.

use crate::{
    errors::GatewayError,
    providers::db::{
        mysql::sql,
        session::{Session, SessionProvider},
    },
    sanitize::Identifier,
    types::{value_to_text, ColumnDescriptor, Page, Pagination, QueryOutcome, SqlParam},
    validate::ValidatedQuery,
};
use serde_json::Value;
use std::{future::Future, time::Duration, time::Instant};
use tracing::{debug, info};

/// Runs gateway operations against sessions from a [`SessionProvider`].
#[derive(Clone, Debug)]
pub struct StatementExecutor {
    provider: Box<dyn SessionProvider>,
    timeout: Option<Duration>,
}

impl StatementExecutor {
    /// Creates an executor with no deadline on database calls.
    pub fn new(provider: Box<dyn SessionProvider>) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    /// Bounds connection-open and each operation by `timeout`. `None` keeps
    /// the unbounded behaviour.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub async fn list_databases(&self) -> Result<Vec<String>, GatewayError> {
        let mut session = self.open().await?;
        let result = self.bounded(list_databases(session.as_mut())).await;
        session.close().await;
        result
    }

    pub async fn list_tables(&self, database: &Identifier) -> Result<Vec<String>, GatewayError> {
        let mut session = self.open().await?;
        let result = self.bounded(list_tables(session.as_mut(), database)).await;
        session.close().await;
        result
    }

    pub async fn describe_schema(
        &self,
        database: &Identifier,
        table: &Identifier,
    ) -> Result<Vec<ColumnDescriptor>, GatewayError> {
        let mut session = self.open().await?;
        let result = self
            .bounded(describe_schema(session.as_mut(), database, table))
            .await;
        session.close().await;
        result
    }

    pub async fn fetch_page(
        &self,
        database: &Identifier,
        table: &Identifier,
        pagination: Pagination,
    ) -> Result<Page, GatewayError> {
        let mut session = self.open().await?;
        let result = self
            .bounded(fetch_page(session.as_mut(), database, table, pagination))
            .await;
        session.close().await;
        result
    }

    pub async fn run_query(
        &self,
        database: &Identifier,
        query: &ValidatedQuery,
    ) -> Result<QueryOutcome, GatewayError> {
        let mut session = self.open().await?;
        let result = self.bounded(run_query(session.as_mut(), database, query)).await;
        session.close().await;
        result
    }

    async fn open(&self) -> Result<Box<dyn Session>, GatewayError> {
        debug!(provider = self.provider.name(), "Opening read-only session");
        self.bounded(self.provider.open()).await
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| GatewayError::Timeout(limit))?,
            None => fut.await,
        }
    }
}

/// `SHOW DATABASES`, first column of each row.
pub async fn list_databases(session: &mut dyn Session) -> Result<Vec<String>, GatewayError> {
    Ok(session.query(sql::SHOW_DATABASES, &[]).await?.first_column())
}

/// Selects `database`, then `SHOW TABLES`.
pub async fn list_tables(
    session: &mut dyn Session,
    database: &Identifier,
) -> Result<Vec<String>, GatewayError> {
    session.select_database(database).await?;
    Ok(session.query(sql::SHOW_TABLES, &[]).await?.first_column())
}

/// Column metadata from `INFORMATION_SCHEMA.COLUMNS`. Both names are bound as
/// values here, so an unknown table simply yields no rows.
pub async fn describe_schema(
    session: &mut dyn Session,
    database: &Identifier,
    table: &Identifier,
) -> Result<Vec<ColumnDescriptor>, GatewayError> {
    let params = [
        SqlParam::from(database.as_str()),
        SqlParam::from(table.as_str()),
    ];
    let result = session.query(sql::DESCRIBE_COLUMNS, &params).await?;
    result.rows.into_iter().map(descriptor_from_row).collect()
}

/// Total row count plus one bounded page of `table`.
pub async fn fetch_page(
    session: &mut dyn Session,
    database: &Identifier,
    table: &Identifier,
    pagination: Pagination,
) -> Result<Page, GatewayError> {
    session.select_database(database).await?;

    let counted = session.query(&sql::count_rows(table), &[]).await?;
    let total_count = counted
        .rows
        .first()
        .and_then(|row| row.first())
        .and_then(value_to_count)
        .ok_or_else(|| GatewayError::Decode(format!("COUNT(*) on `{table}` returned no number")))?;

    let params = [SqlParam::Int(pagination.limit), SqlParam::Int(pagination.offset)];
    let page = session.query(&sql::select_page(table), &params).await?;

    Ok(Page {
        rows: page.into_records(),
        total_count,
    })
}

/// Runs caller SQL verbatim and times the statement itself.
///
/// Column names are reported only when at least one row matched.
pub async fn run_query(
    session: &mut dyn Session,
    database: &Identifier,
    query: &ValidatedQuery,
) -> Result<QueryOutcome, GatewayError> {
    session.select_database(database).await?;

    let started = Instant::now();
    let result = session.query_raw(query.as_str()).await?;
    let execution_time_ms = round_ms(started.elapsed());

    let columns = if result.rows.is_empty() {
        Vec::new()
    } else {
        result.columns
    };
    info!(
        rows = result.rows.len(),
        execution_time_ms, "Caller query finished"
    );

    Ok(QueryOutcome {
        columns,
        rows: result.rows,
        execution_time_ms,
    })
}

/// Milliseconds rounded to two decimal places.
pub fn round_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

fn value_to_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn descriptor_from_row(row: Vec<Value>) -> Result<ColumnDescriptor, GatewayError> {
    let mut cells = row.into_iter();
    let mut next = || {
        cells.next().ok_or_else(|| {
            GatewayError::Decode("INFORMATION_SCHEMA.COLUMNS row is missing fields".to_string())
        })
    };

    Ok(ColumnDescriptor {
        name: value_to_text(&next()?).unwrap_or_default(),
        data_type: value_to_text(&next()?).unwrap_or_default(),
        nullable: value_to_text(&next()?).unwrap_or_default(),
        key_type: value_to_text(&next()?).unwrap_or_default(),
        default_value: value_to_text(&next()?),
        extra: value_to_text(&next()?).unwrap_or_default(),
    })
}
