use crate::{
    errors::GatewayError,
    providers::db::session::{Session, SessionProvider},
    sanitize::Identifier,
    types::{RowSet, SqlParam},
};
use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::{
    mysql::{types::MySqlTime, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow},
    query::Query,
    Column, Connection, Executor, MySql, Row, TypeInfo, ValueRef,
};
use std::fmt::{self, Debug};
use tracing::{debug, warn};

pub mod sql;

/// Connection parameters for the backing MySQL server.
#[derive(Clone, Default)]
pub struct MySqlSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Default schema sent with the handshake. Empty means none.
    pub database: String,
}

impl Debug for MySqlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

/// Opens one `MySqlConnection` per call. There is no pool: the caller owns
/// the session until it closes it.
#[derive(Clone)]
pub struct MySqlProvider {
    options: MySqlConnectOptions,
}

impl MySqlProvider {
    pub fn new(settings: &MySqlSettings) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password);
        if !settings.database.is_empty() {
            options = options.database(&settings.database);
        }
        Self { options }
    }
}

impl Debug for MySqlProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionProvider for MySqlProvider {
    fn name(&self) -> &str {
        "MySQL"
    }

    async fn open(&self) -> Result<Box<dyn Session>, GatewayError> {
        let mut conn = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        for directive in sql::READ_ONLY_SESSION_DIRECTIVES {
            debug!(directive, "--> Pinning MySQL session");
            if let Err(e) = Executor::execute(&mut conn, directive).await {
                // A session that could not be made read-only is not handed out.
                let _ = conn.close().await;
                return Err(GatewayError::Connection(format!(
                    "failed to apply '{directive}': {e}"
                )));
            }
        }

        Ok(Box::new(MySqlSession { conn }))
    }
}

struct MySqlSession {
    conn: MySqlConnection,
}

#[async_trait]
impl Session for MySqlSession {
    async fn select_database(&mut self, database: &Identifier) -> Result<(), GatewayError> {
        let statement = sql::use_database(database);
        debug!(statement = %statement, "--> Selecting database");
        // A bare `&str` goes over the text protocol; `USE` cannot be prepared.
        Executor::execute(&mut self.conn, statement.as_str()).await?;
        Ok(())
    }

    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<RowSet, GatewayError> {
        debug!(sql = %sql, ?params, "--> Executing MySQL statement");
        let mut query = sqlx::query(sql).persistent(false);
        for param in params {
            query = bind_param(query, param);
        }
        let rows = query.fetch_all(&mut self.conn).await?;
        rows_to_row_set(&rows)
    }

    async fn query_raw(&mut self, sql: &str) -> Result<RowSet, GatewayError> {
        debug!(sql = %sql, "--> Executing caller query");
        // A single prepared statement: like the engine's plain query call,
        // multi-statement strings are refused rather than run in sequence.
        let rows = sqlx::query(sql)
            .persistent(false)
            .fetch_all(&mut self.conn)
            .await?;
        rows_to_row_set(&rows)
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            warn!("Error while closing MySQL session: {e}");
        }
    }
}

fn bind_param<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    param: &SqlParam,
) -> Query<'q, MySql, MySqlArguments> {
    match param {
        SqlParam::Text(s) => query.bind(s.clone()),
        SqlParam::Int(i) => query.bind(*i),
    }
}

fn rows_to_row_set(rows: &[MySqlRow]) -> Result<RowSet, GatewayError> {
    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..row.len() {
            values.push(mysql_cell_to_json(row, idx)?);
        }
        out.push(values);
    }
    Ok(RowSet::new(columns, out))
}

/// Maps one MySQL cell onto JSON. Integers and floats keep their numeric
/// type; DECIMAL, temporal and character types become strings.
fn mysql_cell_to_json(row: &MySqlRow, idx: usize) -> Result<Value, GatewayError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        // TINYINT(1) is reported as BOOLEAN; it is still sent as 0/1.
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::from(row.try_get_unchecked::<i64, _>(idx)?)
        }
        name if name.ends_with("UNSIGNED") => Value::from(row.try_get_unchecked::<u64, _>(idx)?),
        "FLOAT" => float_to_json(f64::from(row.try_get::<f32, _>(idx)?)),
        "DOUBLE" => float_to_json(row.try_get::<f64, _>(idx)?),
        "DATE" => Value::String(
            row.try_get::<chrono::NaiveDate, _>(idx)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|_| "0000-00-00".to_string()),
        ),
        "DATETIME" | "TIMESTAMP" => Value::String(
            row.try_get::<chrono::NaiveDateTime, _>(idx)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
                .unwrap_or_else(|_| "0000-00-00 00:00:00".to_string()),
        ),
        "TIME" => Value::String(row.try_get::<MySqlTime, _>(idx)?.to_string()),
        _ => match row.try_get_unchecked::<String, _>(idx) {
            Ok(s) => Value::String(s),
            Err(_) => {
                let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }
        },
    };
    Ok(value)
}

fn float_to_json(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}
