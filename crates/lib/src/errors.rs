use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the backing database.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The handshake (or the read-only session setup that follows it) failed.
    #[error("Database connection failed: {0}")]
    Connection(String),
    /// The engine rejected a statement. The message is the engine's own text.
    #[error("{0}")]
    Execution(String),
    /// A connect or execute call ran past the configured deadline.
    #[error("Database operation exceeded the configured timeout of {} ms", .0.as_millis())]
    Timeout(Duration),
    /// A value came back in a shape the executor could not map.
    #[error("Failed to decode result set: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => GatewayError::Execution(db_err.message().to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                GatewayError::Decode(format!("column {index}: {source}"))
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => GatewayError::Connection(err.to_string()),
            other => GatewayError::Execution(other.to_string()),
        }
    }
}
