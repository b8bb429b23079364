//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::{DaemonConfig, StorageConfig};
use crate::error::{DaemonError, DaemonResult};
use medtrace_contract::Gateway;
use medtrace_store::{InMemoryWorldState, PostgresWorldState, WorldState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// medtrace daemon server
pub struct Server {
    config: DaemonConfig,
    gateway: Gateway,
}

impl Server {
    /// Open the configured world state and build the gateway over it.
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let state = open_world_state(&config.storage).await?;
        tracing::info!(backend = state.backend_label(), "World state opened");

        Ok(Self {
            gateway: Gateway::new(state),
            config,
        })
    }

    /// Serve until a signal or `POST /shutdown`, then release the world state.
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let state = AppState::new(self.gateway.clone(), shutdown_tx);
        let app = create_router(state, &self.config.server);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("medtrace daemon listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown_rx))
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("medtrace daemon shutting down");
        self.gateway.close().await;

        Ok(())
    }
}

async fn open_world_state(config: &StorageConfig) -> DaemonResult<Arc<dyn WorldState>> {
    match config {
        StorageConfig::Memory => Ok(Arc::new(InMemoryWorldState::new())),
        StorageConfig::Postgres {
            url,
            max_connections,
            connect_timeout_secs,
        } => {
            let store = PostgresWorldState::connect_with_options(
                url,
                *max_connections,
                *connect_timeout_secs,
            )
            .await?;
            Ok(Arc::new(store))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(mut shutdown_rx: watch::Receiver<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let requested = async move {
        loop {
            if shutdown_rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
            if *shutdown_rx.borrow_and_update() {
                break;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
        _ = requested => {
            tracing::info!("Shutdown requested, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_is_default() {
        let state = open_world_state(&StorageConfig::default()).await.unwrap();
        assert_eq!(state.backend_label(), "memory");
    }

    #[tokio::test]
    async fn test_shutdown_signal_resolves_on_request() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(shutdown_signal(rx));

        tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
