use crate::response::error_envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlgate::GatewayError;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into the `{"error": ...}` envelope.
#[derive(Debug)]
pub enum AppError {
    /// A missing, empty, or rejected request parameter.
    BadRequest(String),
    /// Errors originating from `sqlgate`.
    Gateway(GatewayError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError::Gateway(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl AppError {
    /// The status and client-facing message for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Gateway(GatewayError::Execution(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            AppError::Gateway(GatewayError::Connection(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection failed".to_string(),
            ),
            AppError::Gateway(err @ GatewayError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, err.to_string())
            }
            AppError::Gateway(GatewayError::Decode(_)) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred.".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Engine messages go back to the caller verbatim; the rest only reach the log.
        match &self {
            AppError::BadRequest(message) => warn!("Rejected request: {message}"),
            AppError::Gateway(GatewayError::Execution(message)) => {
                warn!("Statement failed: {message}")
            }
            AppError::Gateway(err) => error!("GatewayError: {err}"),
            AppError::Internal(err) => error!("Internal server error: {:?}", err),
        }

        let (status_code, error_message) = self.status_and_message();
        error_envelope(error_message, status_code).into_response()
    }
}
