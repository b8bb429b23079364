//! System lifecycle handlers.

use crate::api::rest::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Request a graceful daemon shutdown.
pub async fn shutdown_daemon(State(state): State<AppState>) -> (StatusCode, &'static str) {
    tracing::info!("Shutdown requested over HTTP");
    if let Err(err) = state.shutdown_tx.send(true) {
        tracing::warn!("Failed to send shutdown signal: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to signal shutdown",
        );
    }

    (StatusCode::OK, "Server is shutting down...")
}
