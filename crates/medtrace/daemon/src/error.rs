//! Error types for medtrace-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medtrace_contract::ContractError;
use medtrace_store::StoreError;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// World state could not be opened
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors.
///
/// Bodies are plain text: clients of the ledger API match on the message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be parsed
    #[error("{0}")]
    BadRequest(String),

    /// The contract rejected the invocation or the commit failed
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ApiError {
    pub fn unparseable_body() -> Self {
        Self::BadRequest("Failed to parse request body".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Contract(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }

        (status, self.to_string()).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
