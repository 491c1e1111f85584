//! API error types
//!
//! Client errors map to 4xx envelopes directly. Store failures and
//! caught panics become a 500 carrying a generic message plus the
//! error description.

use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

use super::request::EventError;
use super::response::Envelope;
use crate::store::{InvalidCursor, StoreError};

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Payload failed validation; carries the ordered messages
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Malformed request (body, query, path, or event)
    #[error("{0}")]
    BadRequest(String),

    /// Route or record absent
    #[error("{0}")]
    NotFound(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Underlying table call failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Handler panicked while serving the request
    #[error("Handler panicked: {0}")]
    Panic(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Panic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Render this error as a response envelope
    pub fn into_envelope(self) -> Envelope {
        let status = self.status_code();
        let body = match &self {
            ApiError::Validation(errors) => json!({
                "message": "Validation failed",
                "errors": errors,
            }),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => json!({ "message": msg }),
            ApiError::Store(_) | ApiError::Panic(_) => json!({
                "message": "Internal Server Error",
                "error": self.to_string(),
            }),
        };
        Envelope::json(status, &body)
    }
}

impl From<InvalidCursor> for ApiError {
    fn from(err: InvalidCursor) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
