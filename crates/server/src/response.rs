//! # Response Envelope
//!
//! Every body this server writes is pretty-printed JSON with four-space
//! indentation and `Content-Type: application/json`.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{json, Value};
use tracing::error;

/// A payload paired with the status it is sent under.
#[derive(Debug)]
pub struct Envelope<T> {
    pub status: StatusCode,
    pub payload: T,
}

/// Wraps `payload` for a `200 OK` response.
pub fn envelope<T: Serialize>(payload: T) -> Envelope<T> {
    Envelope {
        status: StatusCode::OK,
        payload,
    }
}

/// The `{"error": message}` body sent with `status`.
pub fn error_envelope(message: impl Into<String>, status: StatusCode) -> Envelope<Value> {
    Envelope {
        status,
        payload: json!({ "error": message.into() }),
    }
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let json_content_type = [(CONTENT_TYPE, HeaderValue::from_static("application/json"))];
        match to_pretty_json(&self.payload) {
            Ok(body) => (self.status, json_content_type, body).into_response(),
            Err(e) => {
                error!("Failed to serialize response body: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json_content_type,
                    r#"{"error": "Failed to serialize response"}"#,
                )
                    .into_response()
            }
        }
    }
}
