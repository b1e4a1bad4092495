//! The periodic fetch, evaluate and alert loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use strum::Display;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::arbitrage::{CycleReport, Evaluation, SpreadEvaluator};
use crate::control::settings::RuntimeSettings;
use crate::exchange::{AdapterRegistry, TradingPair};
use crate::metrics;
use crate::notify::Notifier;

use super::snapshot::PriceSnapshot;

/// Whether the loop is polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LoopState {
    /// Cycles run on every tick.
    Running,
    /// Idle until resumed.
    Stopped,
}

/// Control handle for a running scan loop.
///
/// The loop exits once every clone of the handle is dropped.
#[derive(Debug, Clone)]
pub struct ScanLoopHandle {
    tx: Arc<watch::Sender<LoopState>>,
}

impl ScanLoopHandle {
    /// New handle in the running state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LoopState::Running);
        Self { tx: Arc::new(tx) }
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        *self.tx.borrow()
    }

    /// Enter STOPPED. Returns `false` if already stopped.
    pub fn stop(&self) -> bool {
        self.set(LoopState::Stopped)
    }

    /// Enter RUNNING. Returns `false` if already running.
    pub fn resume(&self) -> bool {
        self.set(LoopState::Running)
    }

    fn set(&self, next: LoopState) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    fn subscribe(&self) -> watch::Receiver<LoopState> {
        self.tx.subscribe()
    }
}

impl Default for ScanLoopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Results published by the loop for the HTTP surface.
#[derive(Debug, Default)]
pub struct ScanStatus {
    cycles: AtomicU64,
    last_report: RwLock<Option<CycleReport>>,
}

impl ScanStatus {
    /// Empty status, not ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a finished cycle's report.
    pub fn record(&self, report: CycleReport) {
        *self.last_report.write() = Some(report);
        self.cycles.fetch_add(1, Ordering::SeqCst);
    }

    /// Cycles completed since start.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// True once a cycle has completed.
    pub fn is_ready(&self) -> bool {
        self.cycles() > 0
    }

    /// Report of the most recent cycle.
    pub fn last_report(&self) -> Option<CycleReport> {
        self.last_report.read().clone()
    }
}

/// Everything one cycle needs.
pub struct Scanner {
    registry: AdapterRegistry,
    pairs: Vec<TradingPair>,
    evaluator: SpreadEvaluator,
    settings: Arc<RuntimeSettings>,
    notifier: Notifier,
    deadline: Duration,
    status: Arc<ScanStatus>,
}

impl Scanner {
    /// Assemble a scanner. `deadline` bounds each exchange's fetch.
    pub fn new(
        registry: AdapterRegistry,
        pairs: Vec<TradingPair>,
        evaluator: SpreadEvaluator,
        settings: Arc<RuntimeSettings>,
        notifier: Notifier,
        deadline: Duration,
    ) -> Self {
        Self {
            registry,
            pairs,
            evaluator,
            settings,
            notifier,
            deadline,
            status: Arc::new(ScanStatus::new()),
        }
    }

    /// Shared status updated after every cycle.
    pub fn status(&self) -> &Arc<ScanStatus> {
        &self.status
    }

    /// Tracked pairs.
    pub fn pairs(&self) -> &[TradingPair] {
        &self.pairs
    }

    /// Exchange adapters in use.
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Run one full cycle: snapshot, evaluate, deliver, prune.
    ///
    /// Settings are read once at the start; updates made during the cycle
    /// take effect on the next one.
    pub async fn run_cycle(&self) -> CycleReport {
        let timer = metrics::timer_cycle();
        let settings = self.settings.snapshot();

        let snapshot = PriceSnapshot::capture(&self.registry, &self.pairs, self.deadline).await;
        let Evaluation {
            opportunities,
            mut report,
        } = self
            .evaluator
            .evaluate(&snapshot, &settings, &self.pairs, &self.registry)
            .await;

        for opportunity in &opportunities {
            info!(
                pair = %opportunity.pair,
                buy = %opportunity.buy_exchange,
                sell = %opportunity.sell_exchange,
                spread = %opportunity.net_spread,
                "Arbitrage opportunity"
            );
            self.notifier.deliver(opportunity).await;
        }

        let ledger = self.evaluator.ledger();
        let pruned = ledger.prune(Instant::now());
        if pruned > 0 {
            debug!(pruned, remaining = ledger.len(), "Pruned cooldown ledger");
        }
        metrics::set_cooldown_entries(ledger.len());

        report.exchanges_queried = self.registry.len();
        report.exchanges_responding = snapshot.responding();
        report.failed_exchanges = snapshot.failed().to_vec();
        report.quotes = snapshot.quote_count();
        report.elapsed_ms = timer.elapsed_ms() as u64;
        report.finished_at = Some(OffsetDateTime::now_utc());

        self.status.record(report.clone());
        report
    }

    /// Spawn the loop on the runtime.
    pub fn spawn(self: Arc<Self>, handle: &ScanLoopHandle) -> JoinHandle<()> {
        let state = handle.subscribe();
        tokio::spawn(self.run(state))
    }

    /// Poll until the control handle goes away.
    ///
    /// Each cycle runs in its own task so a panic is logged and the loop
    /// carries on after the usual sleep.
    async fn run(self: Arc<Self>, mut state: watch::Receiver<LoopState>) {
        info!(
            exchanges = self.registry.len(),
            pairs = self.pairs.len(),
            interval_secs = self.settings.poll_interval().as_secs(),
            "Scan loop started"
        );

        loop {
            if *state.borrow_and_update() == LoopState::Stopped {
                info!("Scan loop idle");
                if state.wait_for(|s| *s == LoopState::Running).await.is_err() {
                    break;
                }
                info!("Scan loop resumed");
            }

            let scanner = Arc::clone(&self);
            match tokio::spawn(async move { scanner.run_cycle().await }).await {
                Ok(report) => debug!(
                    comparisons = report.comparisons,
                    alerts = report.alerts,
                    elapsed_ms = report.elapsed_ms,
                    "Cycle complete"
                ),
                Err(e) if e.is_panic() => error!(error = %e, "Scan cycle panicked"),
                Err(e) => error!(error = %e, "Scan cycle task failed"),
            }

            if !self.pause(&mut state).await {
                break;
            }
        }

        info!("Scan loop exited");
    }

    /// Sleep the current poll interval. A stop cuts the sleep short.
    /// Returns `false` when the handle has been dropped.
    async fn pause(&self, state: &mut watch::Receiver<LoopState>) -> bool {
        let sleep = tokio::time::sleep(self.settings.poll_interval());
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                changed = state.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                    if *state.borrow_and_update() == LoopState::Stopped {
                        return true;
                    }
                }
            }
        }
    }
}
