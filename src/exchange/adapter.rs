//! The per-venue adapter interface.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ExchangeError;
use crate::orderbook::PriceLevel;

use super::types::{BookSide, ExchangeId, PriceQuote, TradingPair};

/// Quotes returned by one adapter for one cycle.
pub type QuoteMap = HashMap<TradingPair, PriceQuote>;

/// Read-only market data access for a single exchange.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Venue identifier used in fees, logs and alerts.
    fn id(&self) -> &ExchangeId;

    /// Fetch best bid/ask for every pair the venue can quote.
    ///
    /// Never fails: pairs that error are logged and left out of the map.
    async fn fetch_quotes(&self, pairs: &[TradingPair]) -> QuoteMap;

    /// Fetch the top `levels` of one book side, best price first.
    async fn fetch_depth(
        &self,
        pair: &TradingPair,
        side: BookSide,
        levels: usize,
    ) -> Result<Vec<PriceLevel>, ExchangeError>;
}
