//! # Request and Response Types
//!
//! Query-string parameters, the `/query` payload, and the response bodies of
//! every endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlgate::{ColumnDescriptor, Page, Pagination, QueryOutcome};

/// Query string for `GET /tables`.
#[derive(Debug, Default, Deserialize)]
pub struct TablesParams {
    pub database: Option<String>,
}

/// Query string for `GET /schema`.
#[derive(Debug, Default, Deserialize)]
pub struct SchemaParams {
    pub database: Option<String>,
    pub table: Option<String>,
}

/// Query string for `GET /data`. `limit` and `offset` stay raw text here and
/// are coerced by [`Pagination::from_params`].
#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub database: Option<String>,
    pub table: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Body of `POST /query`. Fields are kept as loose JSON so that numbers are
/// accepted as text and `null` counts as absent.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub database: Option<Value>,
    #[serde(default)]
    pub query: Option<Value>,
}

/// Reads a scalar JSON value as text. `null`, arrays and objects yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabasesResponse {
    pub databases: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub schema: Vec<ColumnDescriptor>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationInfo {
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse {
    pub data: Vec<Map<String, Value>>,
    pub pagination: PaginationInfo,
}

impl DataResponse {
    pub fn new(page: Page, pagination: Pagination) -> Self {
        Self {
            data: page.rows,
            pagination: PaginationInfo {
                total: page.total_count,
                offset: pagination.offset,
                limit: pagination.limit,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub execution_time_ms: f64,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            row_count: outcome.row_count(),
            columns: outcome.columns,
            rows: outcome.rows,
            execution_time_ms: outcome.execution_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_text_reads_strings_and_numbers() {
        assert_eq!(scalar_text(&json!("shop")), Some("shop".to_string()));
        assert_eq!(scalar_text(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_text(&Value::Null), None);
        assert_eq!(scalar_text(&json!(["shop"])), None);
    }

    #[test]
    fn query_response_uses_camel_case_keys() {
        let response = QueryResponse::from(QueryOutcome {
            columns: vec!["id".into()],
            rows: vec![vec![json!(1)]],
            execution_time_ms: 0.42,
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"columns": ["id"], "rows": [[1]], "rowCount": 1, "executionTimeMs": 0.42})
        );
    }

    #[test]
    fn data_response_reports_effective_pagination() {
        let page = Page {
            rows: vec![],
            total_count: 7,
        };
        let response = DataResponse::new(page, Pagination::new(5000, -3));
        assert_eq!(
            response.pagination,
            PaginationInfo {
                total: 7,
                offset: 0,
                limit: 1000
            }
        );
    }
}
