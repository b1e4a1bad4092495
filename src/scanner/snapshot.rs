//! Point-in-time view of every venue's quotes.

use std::time::{Duration, Instant};

use futures::future::join_all;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use crate::exchange::{AdapterRegistry, ExchangeId, PriceQuote, QuoteMap, TradingPair};
use crate::metrics;

/// Quotes from one cycle, keyed by exchange then pair.
///
/// Immutable once built. Exchanges that timed out or returned nothing are
/// listed in [`failed`](Self::failed) and have no quotes.
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    quotes: Vec<(ExchangeId, QuoteMap)>,
    failed: Vec<ExchangeId>,
    taken_at: OffsetDateTime,
}

impl PriceSnapshot {
    /// Assemble a snapshot from already-fetched quotes.
    pub fn from_parts(
        quotes: impl IntoIterator<Item = (ExchangeId, QuoteMap)>,
        failed: Vec<ExchangeId>,
    ) -> Self {
        Self {
            quotes: quotes.into_iter().filter(|(_, q)| !q.is_empty()).collect(),
            failed,
            taken_at: OffsetDateTime::now_utc(),
        }
    }

    /// Query every adapter concurrently, each bounded by `deadline`.
    #[instrument(skip_all, fields(exchanges = registry.len(), pairs = pairs.len()))]
    pub async fn capture(
        registry: &AdapterRegistry,
        pairs: &[TradingPair],
        deadline: Duration,
    ) -> Self {
        let fetches = registry.adapters().iter().map(|adapter| async move {
            let id = adapter.id().clone();
            let start = Instant::now();
            let result = tokio::time::timeout(deadline, adapter.fetch_quotes(pairs)).await;
            metrics::record_exchange_fetch_latency(start, id.as_str());
            (id, result)
        });

        let mut quotes = Vec::with_capacity(registry.len());
        let mut failed = Vec::new();
        for (id, result) in join_all(fetches).await {
            match result {
                Ok(map) if !map.is_empty() => {
                    debug!(exchange = %id, quotes = map.len(), "Exchange responded");
                    quotes.push((id, map));
                }
                Ok(_) => {
                    warn!(exchange = %id, "Exchange returned no quotes");
                    metrics::inc_exchange_failures(id.as_str());
                    failed.push(id);
                }
                Err(_) => {
                    warn!(
                        exchange = %id,
                        deadline_secs = deadline.as_secs(),
                        "Exchange timed out, skipping this cycle"
                    );
                    metrics::inc_exchange_failures(id.as_str());
                    failed.push(id);
                }
            }
        }

        Self {
            quotes,
            failed,
            taken_at: OffsetDateTime::now_utc(),
        }
    }

    /// Quote for `pair` on `exchange`, if present.
    pub fn quote(&self, exchange: &ExchangeId, pair: &TradingPair) -> Option<&PriceQuote> {
        self.quotes
            .iter()
            .find(|(id, _)| id == exchange)
            .and_then(|(_, map)| map.get(pair))
    }

    /// Exchanges with at least one quote, in registry order.
    pub fn exchanges(&self) -> impl Iterator<Item = &ExchangeId> {
        self.quotes.iter().map(|(id, _)| id)
    }

    /// Exchanges that failed, timed out or returned nothing.
    pub fn failed(&self) -> &[ExchangeId] {
        &self.failed
    }

    /// Number of exchanges with quotes.
    pub fn responding(&self) -> usize {
        self.quotes.len()
    }

    /// Total quotes across all exchanges.
    pub fn quote_count(&self) -> usize {
        self.quotes.iter().map(|(_, m)| m.len()).sum()
    }

    /// When the snapshot was completed.
    pub fn taken_at(&self) -> OffsetDateTime {
        self.taken_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::MockExchange;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn btc() -> TradingPair {
        TradingPair::parse("BTC/USDT").unwrap()
    }

    #[tokio::test]
    async fn collects_quotes_and_failures() {
        let good = MockExchange::new("binance").quote("BTC/USDT", dec!(100), dec!(101));
        let bad = MockExchange::new("okx").quote("BTC/USDT", dec!(100), dec!(101));
        bad.set_fail_quotes(true);
        let registry = AdapterRegistry::new()
            .with(Arc::new(good))
            .with(Arc::new(bad));

        let snap = PriceSnapshot::capture(&registry, &[btc()], Duration::from_secs(5)).await;

        assert_eq!(snap.responding(), 1);
        assert_eq!(snap.failed(), &[ExchangeId::new("okx")]);
        assert!(snap.quote(&ExchangeId::new("binance"), &btc()).is_some());
        assert!(snap.quote(&ExchangeId::new("okx"), &btc()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_exchange_hits_deadline() {
        let slow = MockExchange::new("kraken").quote("BTC/USDT", dec!(100), dec!(101));
        slow.set_latency(Duration::from_secs(60));
        let fast = MockExchange::new("bybit").quote("BTC/USDT", dec!(100), dec!(101));
        let registry = AdapterRegistry::new()
            .with(Arc::new(slow))
            .with(Arc::new(fast));

        let snap = PriceSnapshot::capture(&registry, &[btc()], Duration::from_secs(25)).await;

        assert_eq!(snap.failed(), &[ExchangeId::new("kraken")]);
        assert_eq!(snap.quote_count(), 1);
    }

    #[test]
    fn from_parts_drops_empty_maps() {
        let snap = PriceSnapshot::from_parts(
            [
                (ExchangeId::new("a"), QuoteMap::new()),
                (
                    ExchangeId::new("b"),
                    QuoteMap::from([(btc(), PriceQuote::new(dec!(1), dec!(2)).unwrap())]),
                ),
            ],
            Vec::new(),
        );
        assert_eq!(snap.exchanges().count(), 1);
    }
}
