//! In-memory exchange adapter for tests.
//!
//! Quotes and books are set up front (or changed between cycles); failure
//! and latency can be toggled to exercise the isolation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::error::ExchangeError;
use crate::orderbook::{normalize_levels, PriceLevel};

use super::adapter::{ExchangeAdapter, QuoteMap};
use super::types::{BookSide, ExchangeId, PriceQuote, TradingPair};

#[derive(Debug, Default)]
struct MockState {
    quotes: Mutex<QuoteMap>,
    books: Mutex<HashMap<(TradingPair, BookSide), Vec<PriceLevel>>>,
    fail_quotes: AtomicBool,
    fail_depth: AtomicBool,
    latency_ms: AtomicU64,
    quote_calls: AtomicUsize,
    depth_calls: AtomicUsize,
}

/// Mock exchange adapter. Clones share state.
#[derive(Debug, Clone)]
pub struct MockExchange {
    id: ExchangeId,
    state: Arc<MockState>,
}

fn pair(symbol: &str) -> TradingPair {
    TradingPair::parse(symbol).unwrap_or_else(|| panic!("invalid mock pair `{}`", symbol))
}

impl MockExchange {
    /// Create an empty mock venue.
    pub fn new(id: &str) -> Self {
        Self {
            id: ExchangeId::new(id),
            state: Arc::new(MockState::default()),
        }
    }

    /// Builder form of [`set_quote`](Self::set_quote).
    pub fn quote(self, symbol: &str, bid: Decimal, ask: Decimal) -> Self {
        self.set_quote(symbol, bid, ask);
        self
    }

    /// Builder form of [`set_depth`](Self::set_depth).
    pub fn depth(self, symbol: &str, side: BookSide, levels: Vec<PriceLevel>) -> Self {
        self.set_depth(symbol, side, levels);
        self
    }

    /// Set or replace the quote for a pair. Non-positive prices remove it.
    pub fn set_quote(&self, symbol: &str, bid: Decimal, ask: Decimal) {
        let mut quotes = self.state.quotes.lock();
        match PriceQuote::new(bid, ask) {
            Some(q) => {
                quotes.insert(pair(symbol), q);
            }
            None => {
                quotes.remove(&pair(symbol));
            }
        }
    }

    /// Set one side of the book for a pair.
    pub fn set_depth(&self, symbol: &str, side: BookSide, levels: Vec<PriceLevel>) {
        self.state
            .books
            .lock()
            .insert((pair(symbol), side), normalize_levels(levels, side));
    }

    /// Make every quote request fail.
    pub fn set_fail_quotes(&self, fail: bool) {
        self.state.fail_quotes.store(fail, Ordering::SeqCst);
    }

    /// Make every depth request fail.
    pub fn set_fail_depth(&self, fail: bool) {
        self.state.fail_depth.store(fail, Ordering::SeqCst);
    }

    /// Delay every request.
    pub fn set_latency(&self, latency: Duration) {
        self.state
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `fetch_quotes` calls so far.
    pub fn quote_calls(&self) -> usize {
        self.state.quote_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_depth` calls so far.
    pub fn depth_calls(&self) -> usize {
        self.state.depth_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let ms = self.state.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl ExchangeAdapter for MockExchange {
    fn id(&self) -> &ExchangeId {
        &self.id
    }

    async fn fetch_quotes(&self, pairs: &[TradingPair]) -> QuoteMap {
        self.state.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.state.fail_quotes.load(Ordering::SeqCst) {
            return QuoteMap::new();
        }

        let quotes = self.state.quotes.lock();
        pairs
            .iter()
            .filter_map(|p| quotes.get(p).map(|q| (p.clone(), *q)))
            .collect()
    }

    async fn fetch_depth(
        &self,
        pair: &TradingPair,
        side: BookSide,
        levels: usize,
    ) -> Result<Vec<PriceLevel>, ExchangeError> {
        self.state.depth_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.state.fail_depth.load(Ordering::SeqCst) {
            return Err(ExchangeError::Status {
                exchange: self.id.to_string(),
                status: 503,
            });
        }

        let books = self.state.books.lock();
        let mut book = books
            .get(&(pair.clone(), side))
            .cloned()
            .unwrap_or_default();
        book.truncate(levels);
        Ok(book)
    }
}
