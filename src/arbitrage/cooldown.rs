//! Alert deduplication by signature and time window.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::exchange::{ExchangeId, TradingPair};

/// Decimal places kept in the spread part of a key.
const SPREAD_DP: u32 = 6;

/// Identity of an alert for deduplication.
///
/// A changed spread (at 6 dp) is a new signature and alerts again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    /// Pair.
    pub pair: TradingPair,
    /// Buy venue.
    pub buy: ExchangeId,
    /// Sell venue.
    pub sell: ExchangeId,
    /// Net spread rounded to 6 dp.
    pub spread: Decimal,
}

impl CooldownKey {
    /// Build a key, rounding the spread.
    pub fn new(pair: &TradingPair, buy: &ExchangeId, sell: &ExchangeId, spread: Decimal) -> Self {
        Self {
            pair: pair.clone(),
            buy: buy.clone(),
            sell: sell.clone(),
            spread: spread.round_dp(SPREAD_DP).normalize(),
        }
    }
}

/// Last alert time per signature.
#[derive(Debug)]
pub struct CooldownLedger {
    window: Duration,
    entries: DashMap<CooldownKey, Instant>,
}

impl CooldownLedger {
    /// Create an empty ledger with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: DashMap::new(),
        }
    }

    /// Suppression window.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn active(&self, last: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last) < self.window
    }

    /// Whether an alert for `key` was recorded less than one window ago.
    pub fn should_suppress(&self, key: &CooldownKey, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|last| self.active(*last, now))
    }

    /// Record an alert for `key` at `now`.
    pub fn record(&self, key: CooldownKey, now: Instant) {
        self.entries.insert(key, now);
    }

    /// Check and record in one step. Returns `true` if the caller may alert.
    pub fn try_acquire(&self, key: CooldownKey, now: Instant) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(mut e) => {
                if self.active(*e.get(), now) {
                    false
                } else {
                    e.insert(now);
                    true
                }
            }
            Entry::Vacant(e) => {
                e.insert(now);
                true
            }
        }
    }

    /// Drop entries whose window has elapsed. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, last| self.active(*last, now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of tracked signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
