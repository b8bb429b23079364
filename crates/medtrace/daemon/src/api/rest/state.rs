//! Application state for API handlers

use medtrace_contract::Gateway;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Contract gateway over the world state
    pub gateway: Gateway,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Graceful shutdown signal sender
    pub shutdown_tx: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(gateway: Gateway, shutdown_tx: watch::Sender<bool>) -> Self {
        Self {
            gateway,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
            shutdown_tx: Arc::new(shutdown_tx),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
