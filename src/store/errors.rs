//! # Store Errors
//!
//! Failures raised by table backends and the user store client.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
///
/// None of these are recovered locally; they surface to the request
/// entry point and become a 500 response.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing table rejected or failed the call
    #[error("Table backend error: {0}")]
    Backend(String),

    /// Item written without its key attribute
    #[error("Item is missing key attribute '{0}'")]
    MissingKey(String),

    /// Stored item could not be decoded
    #[error("Corrupt item: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
