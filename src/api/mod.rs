//! HTTP API: liveness, status, metrics, chat webhook and alert relay.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
