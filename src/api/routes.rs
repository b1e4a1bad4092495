//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{alert, health, metrics, ready, root, status, webhook, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Status and metrics
        .route("/api/v1/status", get(status))
        .route("/metrics", get(metrics))
        // Inbound messages
        .route("/webhook", post(webhook))
        .route("/alert", post(alert))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
