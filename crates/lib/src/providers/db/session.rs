use crate::errors::GatewayError;
use crate::sanitize::Identifier;
use crate::types::{RowSet, SqlParam};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Opens read-only database sessions.
///
/// Implementations must leave every session they hand out in read-only
/// transaction mode with safe updates enabled. A session is never shared
/// between requests.
#[async_trait]
pub trait SessionProvider: Send + Sync + DynClone + Debug {
    /// Returns the name of the backing engine (e.g., "MySQL").
    fn name(&self) -> &str;

    /// Performs the handshake and pins the session to read-only mode.
    async fn open(&self) -> Result<Box<dyn Session>, GatewayError>;
}

dyn_clone::clone_trait_object!(SessionProvider);

/// A single open database session, owned by one request.
#[async_trait]
pub trait Session: Send {
    /// Makes `database` the default schema for subsequent statements.
    async fn select_database(&mut self, database: &Identifier) -> Result<(), GatewayError>;

    /// Prepares `sql`, binds `params` to its `?` placeholders and fetches
    /// every row.
    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<RowSet, GatewayError>;

    /// Runs caller-authored SQL verbatim as a single statement with no bound
    /// parameters. Multi-statement text is refused by the engine.
    async fn query_raw(&mut self, sql: &str) -> Result<RowSet, GatewayError>;

    /// Ends the session. Called exactly once, on every exit path.
    async fn close(self: Box<Self>);
}
