use async_trait::async_trait;
use serde_json::Value;
use sqlgate::{GatewayError, Identifier, RowSet, Session, SessionProvider, SqlParam};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Installs the same compact, env-filtered subscriber the server uses.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();
    });
}

/// Builds a `RowSet` from column names and rows.
pub fn row_set(columns: &[&str], rows: Vec<Vec<Value>>) -> RowSet {
    RowSet::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

// --- Mock Session Provider ---

/// One statement as seen by a `MockSession`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SelectDatabase(String),
    Query { sql: String, params: Vec<SqlParam> },
    QueryRaw(String),
}

#[derive(Default)]
struct MockState {
    replies: Mutex<HashMap<String, Result<RowSet, String>>>,
    known_databases: Mutex<Option<HashSet<String>>>,
    connect_error: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<Call>>,
    connect_attempts: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// A scripted stand-in for MySQL that counts session opens and closes.
///
/// Statements without a scripted reply return an empty `RowSet`. Clones
/// share the same script and counters.
#[derive(Clone, Default)]
pub struct MockSessionProvider {
    state: Arc<MockState>,
}

impl MockSessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the rows returned for an exact statement text.
    pub fn with_reply(self, sql: &str, rows: RowSet) -> Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(sql.to_string(), Ok(rows));
        self
    }

    /// Scripts an engine error for an exact statement text.
    pub fn with_error(self, sql: &str, message: &str) -> Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(sql.to_string(), Err(message.to_string()));
        self
    }

    /// Restricts `select_database` to these names; others fail like MySQL.
    pub fn with_databases(self, names: &[&str]) -> Self {
        *self.state.known_databases.lock().unwrap() =
            Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Makes every `open` fail with a connection error.
    pub fn failing_connect(self, message: &str) -> Self {
        *self.state.connect_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Delays every statement, to exercise deadlines.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.state.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }
}

impl Debug for MockSessionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSessionProvider")
            .field("opened", &self.opened())
            .field("closed", &self.closed())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn open(&self) -> Result<Box<dyn Session>, GatewayError> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);
        let connect_error = self.state.connect_error.lock().unwrap().clone();
        if let Some(message) = connect_error {
            return Err(GatewayError::Connection(message));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            state: self.state.clone(),
        }))
    }
}

struct MockSession {
    state: Arc<MockState>,
}

impl MockSession {
    async fn record(&self, call: Call) {
        self.state.calls.lock().unwrap().push(call);
        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn reply(&self, sql: &str) -> Result<RowSet, GatewayError> {
        match self.state.replies.lock().unwrap().get(sql) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(message)) => Err(GatewayError::Execution(message.clone())),
            None => Ok(RowSet::default()),
        }
    }
}

#[async_trait]
impl Session for MockSession {
    async fn select_database(&mut self, database: &Identifier) -> Result<(), GatewayError> {
        self.record(Call::SelectDatabase(database.to_string())).await;
        let known = self.state.known_databases.lock().unwrap().clone();
        match known {
            Some(names) if !names.contains(database.as_str()) => Err(GatewayError::Execution(
                format!("Unknown database '{database}'"),
            )),
            _ => Ok(()),
        }
    }

    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<RowSet, GatewayError> {
        self.record(Call::Query {
            sql: sql.to_string(),
            params: params.to_vec(),
        })
        .await;
        self.reply(sql)
    }

    async fn query_raw(&mut self, sql: &str) -> Result<RowSet, GatewayError> {
        self.record(Call::QueryRaw(sql.to_string())).await;
        self.reply(sql)
    }

    async fn close(self: Box<Self>) {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}
