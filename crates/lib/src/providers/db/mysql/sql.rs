//! # MySQL Statements
//!
//! Every statement the gateway issues on its own behalf lives here. Values
//! are bound through `?` placeholders; identifiers cannot be bound, so they
//! are only accepted as sanitized [`Identifier`]s and wrapped in backticks.

use crate::sanitize::Identifier;

/// Issued right after the handshake, in order.
pub const READ_ONLY_SESSION_DIRECTIVES: [&str; 2] = [
    "SET SESSION TRANSACTION READ ONLY",
    "SET SESSION SQL_SAFE_UPDATES = 1",
];

pub const SHOW_DATABASES: &str = "SHOW DATABASES";

pub const SHOW_TABLES: &str = "SHOW TABLES";

/// Binds `TABLE_SCHEMA` then `TABLE_NAME`.
pub const DESCRIBE_COLUMNS: &str = "SELECT \
    COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_KEY, COLUMN_DEFAULT, EXTRA \
    FROM INFORMATION_SCHEMA.COLUMNS \
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
    ORDER BY ORDINAL_POSITION";

pub fn use_database(database: &Identifier) -> String {
    format!("USE `{database}`")
}

pub fn count_rows(table: &Identifier) -> String {
    format!("SELECT COUNT(*) FROM `{table}`")
}

/// Binds `LIMIT` then `OFFSET`.
pub fn select_page(table: &Identifier) -> String {
    format!("SELECT * FROM `{table}` LIMIT ? OFFSET ?")
}
