use modguard_core::error::CoreError;

/// Failure reported by a request store.
///
/// Callers treat every variant except [`StoreError::Conflict`] the same way:
/// the attempted change is not applied and the user is notified.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the given id exists.
    #[error("Request {id} not found")]
    NotFound { id: String },

    /// The record changed since it was read.
    #[error("Request {id} was modified concurrently (expected version {expected})")]
    Conflict { id: String, expected: i64 },

    /// The payload was rejected before it was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with a non-2xx status.
    #[error("Store API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Missing or malformed store configuration.
    #[error("Store configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => StoreError::Validation(msg),
            other => StoreError::Validation(other.to_string()),
        }
    }
}
