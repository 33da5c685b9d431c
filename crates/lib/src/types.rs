//! Request-scoped value types shared by the executor and its callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 1000;
pub const DEFAULT_OFFSET: i64 = 0;

/// Clamped paging window for `FetchPage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_OFFSET)
    }
}

impl Pagination {
    /// Clamps `limit` into `[MIN_LIMIT, MAX_LIMIT]` and `offset` to `>= 0`.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(MIN_LIMIT, MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Builds a window from raw query-string values. Absent values take the
    /// defaults; present ones go through [`coerce_int`] before clamping.
    pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit.map(coerce_int).unwrap_or(DEFAULT_LIMIT);
        let offset = offset.map(coerce_int).unwrap_or(DEFAULT_OFFSET);
        Self::new(limit, offset)
    }
}

/// Loose integer coercion for query-string numbers.
///
/// Leading whitespace is skipped, then the longest numeric prefix is read:
/// an optional sign, digits, and optionally a fraction and an exponent.
/// Integer prefixes saturate at the `i64` bounds; prefixes with a fraction or
/// exponent go through `f64` and truncate toward zero (`"1e3"` is `1000`,
/// `"3.9"` is `3`). Anything unparseable or infinite is `0`.
pub fn coerce_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let sign_len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = digits_from(sign_len);
    let int_digits = end - sign_len;
    let mut is_float = false;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if int_digits > 0 || frac_end > end + 1 {
            end = frac_end;
            is_float = true;
        }
    }
    if end == sign_len {
        return 0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + exp_sign);
        if exp_end > end + 1 + exp_sign {
            end = exp_end;
            is_float = true;
        }
    }

    if is_float {
        let value: f64 = s[..end].parse().unwrap_or(0.0);
        // `as` saturates at the i64 bounds for finite values.
        return if value.is_finite() { value as i64 } else { 0 };
    }

    let negative = bytes.first() == Some(&b'-');
    let mut value: i64 = 0;
    for b in &bytes[sign_len..end] {
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10);
        value = if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        };
    }
    value
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

/// Columns and rows as the driver returned them, in order.
///
/// `columns` is only populated when at least one row came back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Turns each row into an ordered `column -> value` object.
    pub fn into_records(self) -> Vec<Map<String, Value>> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }

    /// The first column of every row rendered as text; used for `SHOW ...`.
    pub fn first_column(self) -> Vec<String> {
        self.rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .map(|value| value_to_text(&value).unwrap_or_default())
            .collect()
    }
}

/// Renders a cell as text, with `NULL` as `None`.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// One row of `INFORMATION_SCHEMA.COLUMNS`, serialized under the engine's own
/// column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(rename = "COLUMN_NAME")]
    pub name: String,
    #[serde(rename = "DATA_TYPE")]
    pub data_type: String,
    #[serde(rename = "IS_NULLABLE")]
    pub nullable: String,
    #[serde(rename = "COLUMN_KEY")]
    pub key_type: String,
    #[serde(rename = "COLUMN_DEFAULT")]
    pub default_value: Option<String>,
    #[serde(rename = "EXTRA")]
    pub extra: String,
}

/// Result of `FetchPage`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub rows: Vec<Map<String, Value>>,
    pub total_count: i64,
}

/// Result of `RunQuery`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Wall-clock milliseconds, rounded to two decimals.
    pub execution_time_ms: f64,
}

impl QueryOutcome {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
