//! Prometheus metrics for scan latency and detection outcomes.
//!
//! This module provides metrics for:
//! - Full cycle latency
//! - Per-exchange quote fetch latency
//! - Comparison, alert and rejection counters
//! - Exchange and notification failures

use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Cycle latency metric name.
pub const METRIC_CYCLE_LATENCY: &str = "scan_cycle_latency_ms";
/// Per-exchange fetch latency metric name.
pub const METRIC_EXCHANGE_FETCH_LATENCY: &str = "exchange_fetch_latency_ms";
/// Comparisons counter metric name.
pub const METRIC_COMPARISONS: &str = "spread_comparisons_total";
/// Alerts counter metric name.
pub const METRIC_ALERTS: &str = "spread_alerts_total";
/// Suppressed alerts counter metric name.
pub const METRIC_SUPPRESSED: &str = "spread_alerts_suppressed_total";
/// Liquidity rejections counter metric name.
pub const METRIC_LIQUIDITY_REJECTED: &str = "spread_liquidity_rejected_total";
/// Implausible spreads counter metric name.
pub const METRIC_IMPLAUSIBLE: &str = "spread_implausible_total";
/// Exchange failures counter metric name.
pub const METRIC_EXCHANGE_FAILURES: &str = "exchange_failures_total";
/// Notification failures counter metric name.
pub const METRIC_NOTIFY_FAILURES: &str = "notification_failures_total";
/// Cooldown ledger size gauge metric name.
pub const METRIC_COOLDOWN_ENTRIES: &str = "cooldown_ledger_entries";

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, String> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| e.to_string())?;
    init_metrics();
    Ok(handle)
}

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_histogram!(METRIC_CYCLE_LATENCY, "Full scan cycle latency in milliseconds");
    describe_histogram!(
        METRIC_EXCHANGE_FETCH_LATENCY,
        "Per-exchange quote fetch latency in milliseconds"
    );

    describe_counter!(METRIC_COMPARISONS, "Exchange-pair comparisons evaluated");
    describe_counter!(METRIC_ALERTS, "Opportunity alerts emitted");
    describe_counter!(METRIC_SUPPRESSED, "Opportunities suppressed by cooldown");
    describe_counter!(
        METRIC_LIQUIDITY_REJECTED,
        "Opportunities rejected for thin order books"
    );
    describe_counter!(METRIC_IMPLAUSIBLE, "Spreads above the sanity bound");
    describe_counter!(
        METRIC_EXCHANGE_FAILURES,
        "Exchanges that failed or timed out in a cycle"
    );
    describe_counter!(METRIC_NOTIFY_FAILURES, "Notification deliveries that failed");

    describe_gauge!(METRIC_COOLDOWN_ENTRIES, "Live entries in the cooldown ledger");

    debug!("Metrics initialized");
}

/// Record one exchange's quote fetch latency.
pub fn record_exchange_fetch_latency(start: Instant, exchange: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_EXCHANGE_FETCH_LATENCY, "exchange" => exchange.to_string())
        .record(latency_ms);
}

/// Add to the comparisons counter.
pub fn add_comparisons(n: u64) {
    counter!(METRIC_COMPARISONS).increment(n);
}

/// Increment alerts counter.
pub fn inc_alerts() {
    counter!(METRIC_ALERTS).increment(1);
}

/// Increment suppressed counter.
pub fn inc_suppressed() {
    counter!(METRIC_SUPPRESSED).increment(1);
}

/// Increment liquidity rejections counter.
pub fn inc_liquidity_rejected() {
    counter!(METRIC_LIQUIDITY_REJECTED).increment(1);
}

/// Increment implausible spreads counter.
pub fn inc_implausible() {
    counter!(METRIC_IMPLAUSIBLE).increment(1);
}

/// Increment exchange failures counter.
pub fn inc_exchange_failures(exchange: &str) {
    counter!(METRIC_EXCHANGE_FAILURES, "exchange" => exchange.to_string()).increment(1);
}

/// Increment notification failures counter.
pub fn inc_notify_failures() {
    counter!(METRIC_NOTIFY_FAILURES).increment(1);
}

/// Set the cooldown ledger size gauge.
pub fn set_cooldown_entries(n: usize) {
    gauge!(METRIC_COOLDOWN_ENTRIES).set(n as f64);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a full scan cycle.
pub fn timer_cycle() -> LatencyTimer {
    LatencyTimer::new(METRIC_CYCLE_LATENCY)
}
