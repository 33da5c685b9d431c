//! # sqlgate
//!
//! The core of a read-only HTTP gateway over MySQL: the identifier sanitizer,
//! the SELECT-only query gate, the read-only session provider and the
//! statement executor that ties them together. HTTP concerns live in the
//! `sqlgate-server` crate.

pub mod errors;
pub mod executor;
pub mod providers;
pub mod sanitize;
pub mod types;
pub mod validate;

pub use errors::GatewayError;
pub use executor::StatementExecutor;
pub use providers::db::{
    mysql::{MySqlProvider, MySqlSettings},
    session::{Session, SessionProvider},
};
pub use sanitize::{sanitize, Identifier};
pub use types::{ColumnDescriptor, Page, Pagination, QueryOutcome, RowSet, SqlParam};
pub use validate::{validate, ValidatedQuery};
