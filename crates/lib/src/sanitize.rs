//! # Identifier Sanitizer
//!
//! Database and table names cannot be bound as statement parameters, so they
//! are interpolated into SQL text. Before that happens they are reduced to
//! the character class `[A-Za-z0-9_]`.

use std::fmt;

/// Removes every character outside `[A-Za-z0-9_]`.
///
/// Never fails. Non-ASCII characters are removed as well, so a fully
/// invalid input comes back as an empty string.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// A sanitized, non-empty database or table name.
///
/// The only way to build one is [`Identifier::parse`], so any value of this
/// type is safe to place between backticks in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Sanitizes `raw` and returns `None` when nothing survives.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = sanitize(raw);
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
