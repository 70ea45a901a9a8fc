//! Error types for the proxy service and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use vectorlens_core::LensError;

/// Errors raised while serving a proxy request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// An upstream or validation failure from the core crate.
    #[error(transparent)]
    Lens(#[from] LensError),

    /// The request body was not valid JSON for the endpoint.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The sync command could not be run to completion.
    #[error("Sync failed: {0}")]
    Sync(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Lens(LensError::InvalidInput(_)) | ProxyError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Lens(LensError::NotFound(_)) => StatusCode::NOT_FOUND,
            ProxyError::Lens(
                LensError::Unreachable { .. } | LensError::BadResponse { .. } | LensError::Decode(_),
            ) => StatusCode::BAD_GATEWAY,
            ProxyError::Lens(LensError::Config(_)) | ProxyError::Sync(_) | ProxyError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// A convenience result type for proxy handlers.
pub type Result<T> = std::result::Result<T, ProxyError>;
