//! # Query Validator
//!
//! Gate for caller-authored SQL. A query is accepted when its trimmed,
//! ASCII-uppercased text starts with `SELECT` and the uppercased text contains
//! none of [`FORBIDDEN_KEYWORDS`] as a substring.
//!
//! This is a substring denylist and it is deliberately left crude: `SETTINGS`
//! trips the `SET` rule, and statement separators or comments are not
//! inspected at all. The read-only session is the second line of defence.

use std::fmt;

/// Keywords that reject a query wherever they appear, inside identifiers and
/// string literals included.
pub const FORBIDDEN_KEYWORDS: [&str; 11] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE", "REPLACE", "GRANT",
    "REVOKE", "SET",
];

/// Returns `true` when `query` passes the SELECT-only denylist gate.
pub fn validate(query: &str) -> bool {
    let upper = query.to_ascii_uppercase();

    if !upper.trim().starts_with("SELECT") {
        return false;
    }

    !FORBIDDEN_KEYWORDS
        .iter()
        .any(|keyword| upper.contains(keyword))
}

/// Caller SQL that has passed [`validate`].
///
/// Built per request through [`ValidatedQuery::new`]; results are never
/// cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery(String);

impl ValidatedQuery {
    /// Runs the gate and keeps the original text (not the uppercased copy).
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        validate(&raw).then_some(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
