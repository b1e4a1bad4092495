//! HTTP API handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arbitrage::CycleReport;
use crate::control::ControlSurface;
use crate::exchange::ExchangeId;
use crate::notify::{Notifier, RelayAlert};
use crate::scanner::{LoopState, ScanStatus};

/// Header carrying the relay token.
pub const RELAY_TOKEN_HEADER: &str = "x-relay-token";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Results of completed cycles.
    pub status: Arc<ScanStatus>,
    /// Chat command executor.
    pub control: ControlSurface,
    /// Outbound messages.
    pub notifier: Notifier,
    /// Shared secret for `/alert`; relay is refused when unset.
    pub relay_token: Option<Arc<str>>,
    /// Prometheus renderer, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        status: Arc<ScanStatus>,
        control: ControlSurface,
        notifier: Notifier,
        relay_token: Option<String>,
    ) -> Self {
        Self {
            status,
            control,
            notifier,
            relay_token: relay_token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .map(Arc::from),
            metrics: None,
        }
    }

    /// Serve `/metrics` from `handle`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// True once the first cycle has completed.
    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    fn relay_authorized(&self, presented: Option<&str>) -> bool {
        match (self.relay_token.as_deref(), presented) {
            (Some(expected), Some(given)) => expected == given.trim(),
            _ => false,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether a cycle has completed.
    pub ready: bool,
    /// Cycles completed so far.
    pub cycles: u64,
}

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Loop state.
    pub state: LoopState,
    /// Cycles completed so far.
    pub cycles: u64,
    /// Alert threshold as a fraction.
    pub threshold: Decimal,
    /// Seconds between cycles.
    pub poll_interval_secs: u64,
    /// Fee overrides in percent.
    pub fees: BTreeMap<ExchangeId, Decimal>,
    /// Most recent cycle.
    pub last_report: Option<CycleReport>,
}

/// Telegram update, reduced to what the webhook reads.
#[derive(Debug, Deserialize)]
struct Update {
    message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Query string accepted by `/alert`.
#[derive(Debug, Deserialize)]
pub struct RelayQuery {
    /// Relay token.
    pub token: Option<String>,
}

/// Liveness text.
pub async fn root() -> &'static str {
    "Arbitrage bot running"
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 after the first cycle, 503 before.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let response = ReadyResponse {
        ready: state.is_ready(),
        cycles: state.status.cycles(),
    };

    if response.ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Status handler - loop state, settings and the last cycle report.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.control.settings().settings();

    Json(StatusResponse {
        state: state.control.scan().state(),
        cycles: state.status.cycles(),
        threshold: settings.threshold(),
        poll_interval_secs: settings.poll_interval().as_secs(),
        fees: settings.fees(),
        last_report: state.status.last_report(),
    })
}

/// Prometheus exposition.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Chat webhook. Always answers 200 so the chat API does not redeliver.
pub async fn webhook(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!(error = %e, "Ignoring unparseable webhook body");
            return StatusCode::OK;
        }
    };

    let Some(IncomingMessage {
        chat,
        text: Some(text),
    }) = update.message
    else {
        return StatusCode::OK;
    };

    let chat_id = chat.id.to_string();
    for reply in state.control.handle(text.trim()).await {
        state.notifier.reply(&chat_id, &reply).await;
    }
    StatusCode::OK
}

/// Third-party alert relay, authenticated by a shared token.
pub async fn alert(
    State(state): State<AppState>,
    Query(query): Query<RelayQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let presented = query.token.as_deref().or_else(|| {
        headers
            .get(RELAY_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
    });

    if !state.relay_authorized(presented) {
        warn!(
            token_present = presented.is_some(),
            relay_configured = state.relay_token.is_some(),
            "Rejected relay alert"
        );
        return (StatusCode::UNAUTHORIZED, "unauthorized");
    }

    let alert: RelayAlert = match serde_json::from_slice(&body) {
        Ok(alert) => alert,
        Err(e) => {
            warn!(error = %e, "Malformed relay alert");
            return (StatusCode::BAD_REQUEST, "invalid alert body");
        }
    };

    info!(
        alert_type = %alert.alert_type,
        monitor = %alert.monitor_name,
        "Relaying alert"
    );
    state.notifier.relay(&alert).await;
    (StatusCode::OK, "ok")
}
