//! # Application State
//!
//! The shared, immutable state handed to every request handler. It holds the
//! configuration and the statement executor; neither carries per-request
//! data, so the state is freely cloned across tasks.

use crate::config::AppConfig;
use sqlgate::{MySqlProvider, SessionProvider, StatementExecutor};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// The configuration loaded once at startup.
    pub config: Arc<AppConfig>,
    /// Opens a fresh read-only session for each operation.
    pub executor: Arc<StatementExecutor>,
}

impl AppState {
    pub fn new(config: AppConfig, provider: Box<dyn SessionProvider>) -> Self {
        let executor = StatementExecutor::new(provider).with_timeout(config.query_timeout());
        Self {
            config: Arc::new(config),
            executor: Arc::new(executor),
        }
    }
}

/// Builds the state backed by the configured MySQL server. No connection is
/// made here; sessions are opened per request.
pub fn build_app_state(config: AppConfig) -> AppState {
    let provider = MySqlProvider::new(&config.mysql_settings());
    AppState::new(config, Box::new(provider))
}
