//! Runtime-mutable detection settings.
//!
//! The scan loop reads a [`SettingsSnapshot`] once per cycle. Writers never
//! touch [`RuntimeSettings`] directly; they send a [`SettingsUpdate`] to the
//! settings task, which validates, applies and acknowledges it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::SettingsError;
use crate::exchange::ExchangeId;

/// Smallest accepted poll interval.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

const CHANNEL_CAPACITY: usize = 32;

/// A requested change to runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    /// New alert threshold as a fraction.
    Threshold(Decimal),
    /// Fee percent for one exchange.
    Fee {
        /// Venue.
        exchange: ExchangeId,
        /// Fee in percent.
        percent: Decimal,
    },
    /// New poll interval in seconds.
    PollInterval(u64),
}

/// Settings as seen by one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsSnapshot {
    /// Minimum net spread to alert, as a fraction.
    pub threshold: Decimal,
    /// Seconds between cycles.
    pub poll_interval_secs: u64,
    /// Fee overrides in percent.
    pub fees: HashMap<ExchangeId, Decimal>,
}

impl SettingsSnapshot {
    /// Fee for `exchange`, zero when not overridden.
    pub fn fee(&self, exchange: &ExchangeId) -> Decimal {
        self.fees.get(exchange).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Shared, mutable settings.
#[derive(Debug)]
pub struct RuntimeSettings {
    threshold: RwLock<Decimal>,
    poll_interval_secs: RwLock<u64>,
    fees: DashMap<ExchangeId, Decimal>,
}

impl RuntimeSettings {
    /// Create settings with initial values.
    pub fn new(
        threshold: Decimal,
        poll_interval_secs: u64,
        fees: impl IntoIterator<Item = (ExchangeId, Decimal)>,
    ) -> Self {
        Self {
            threshold: RwLock::new(threshold),
            poll_interval_secs: RwLock::new(poll_interval_secs),
            fees: fees.into_iter().collect(),
        }
    }

    /// Current threshold as a fraction.
    pub fn threshold(&self) -> Decimal {
        *self.threshold.read()
    }

    /// Current poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(*self.poll_interval_secs.read())
    }

    /// Fee for `exchange`, zero when not overridden.
    pub fn fee(&self, exchange: &ExchangeId) -> Decimal {
        self.fees
            .get(exchange)
            .map(|f| *f)
            .unwrap_or(Decimal::ZERO)
    }

    /// Fee overrides sorted by exchange.
    pub fn fees(&self) -> BTreeMap<ExchangeId, Decimal> {
        self.fees
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    /// Copy the current values for one cycle.
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            threshold: self.threshold(),
            poll_interval_secs: *self.poll_interval_secs.read(),
            fees: self
                .fees
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
        }
    }

    /// Validate and apply an update.
    pub fn apply(&self, update: &SettingsUpdate) -> Result<(), SettingsError> {
        match update {
            SettingsUpdate::Threshold(value) => {
                if *value < Decimal::ZERO {
                    return Err(SettingsError::NegativeThreshold(*value));
                }
                *self.threshold.write() = *value;
            }
            SettingsUpdate::Fee { exchange, percent } => {
                if *percent < Decimal::ZERO || *percent >= Decimal::ONE_HUNDRED {
                    return Err(SettingsError::FeeOutOfRange(*percent));
                }
                self.fees.insert(exchange.clone(), *percent);
            }
            SettingsUpdate::PollInterval(secs) => {
                if *secs < MIN_POLL_INTERVAL_SECS {
                    return Err(SettingsError::IntervalTooSmall {
                        requested: *secs,
                        minimum: MIN_POLL_INTERVAL_SECS,
                    });
                }
                *self.poll_interval_secs.write() = *secs;
            }
        }
        Ok(())
    }
}

struct SettingsRequest {
    update: SettingsUpdate,
    ack: oneshot::Sender<Result<(), SettingsError>>,
}

/// Handle for submitting updates to the settings task.
#[derive(Clone)]
pub struct SettingsClient {
    tx: mpsc::Sender<SettingsRequest>,
    settings: Arc<RuntimeSettings>,
}

impl SettingsClient {
    /// Submit an update and wait for the task to apply or reject it.
    pub async fn update(&self, update: SettingsUpdate) -> Result<(), SettingsError> {
        let (ack, rx) = oneshot::channel();
        self.tx
            .send(SettingsRequest { update, ack })
            .await
            .map_err(|_| SettingsError::ChannelClosed)?;
        rx.await.map_err(|_| SettingsError::ChannelClosed)?
    }

    /// Read access to the current settings.
    pub fn settings(&self) -> &Arc<RuntimeSettings> {
        &self.settings
    }
}

/// Spawn the task that owns settings mutation.
///
/// The task ends once every [`SettingsClient`] is dropped.
pub fn spawn_settings_task(settings: Arc<RuntimeSettings>) -> (SettingsClient, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<SettingsRequest>(CHANNEL_CAPACITY);
    let task_settings = Arc::clone(&settings);

    let handle = tokio::spawn(async move {
        while let Some(SettingsRequest { update, ack }) = rx.recv().await {
            let result = task_settings.apply(&update);
            match &result {
                Ok(()) => info!(update = ?update, "Settings updated"),
                Err(e) => warn!(update = ?update, error = %e, "Settings update rejected"),
            }
            let _ = ack.send(result);
        }
        info!("Settings task stopped");
    });

    (SettingsClient { tx, settings }, handle)
}
