//! Error types for the `vectorlens-core` crate.

use thiserror::Error;

/// Errors that can occur while talking to a collection backend.
#[derive(Debug, Error)]
pub enum LensError {
    /// The backend could not be reached at all (connection refused, DNS, timeout).
    #[error("Backend unreachable ({endpoint}): {message}")]
    Unreachable {
        /// The URL that was being requested.
        endpoint: String,
        /// A description of the transport failure.
        message: String,
    },

    /// A referenced collection or chunk does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-2xx status.
    #[error("Backend returned {status}: {body}")]
    BadResponse {
        /// The HTTP status code.
        status: u16,
        /// The verbatim response body text.
        body: String,
    },

    /// The request was rejected before any network call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A 2xx response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LensError {
    /// Whether this error signals that the backend is not reachable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LensError::Unreachable { .. })
    }
}

/// A convenience result type for vectorlens operations.
pub type Result<T> = std::result::Result<T, LensError>;
