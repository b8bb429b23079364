//! API Router configuration

use super::handlers;
use super::state::AppState;
use crate::config::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        // Ledger bootstrap and listing
        .route("/initLedger", get(handlers::init_ledger))
        .route("/medicines", get(handlers::list_medicines))
        // Single medicine
        .route("/get", post(handlers::get_medicine))
        .route("/create", post(handlers::create_medicine))
        .route("/update", post(handlers::update_medicine))
        .route("/delete", post(handlers::delete_medicine))
        .route("/exists", post(handlers::medicine_exists))
        .route("/transfer", post(handlers::transfer_medicine))
        .route("/journey", post(handlers::complete_journey))
        // Provenance
        .route("/history", post(handlers::medicine_history))
        .route("/audit", post(handlers::medicine_audit_trail))
        // Lifecycle
        .route("/health", get(handlers::health_check))
        .route("/shutdown", post(handlers::shutdown_daemon))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let router = if config.enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
