//! Public REST venues and the generic adapter that drives them.
//!
//! Each venue only knows its URLs, symbol format and payload shapes. Timeouts,
//! fan-out, logging and error isolation live in [`RestExchange`].

mod binance;
mod bitfinex;
mod bitget;
mod bitstamp;
mod bybit;
mod coinbase;
mod gateio;
mod htx;
mod kraken;
mod kucoin;
mod mexc;
mod okx;

pub use binance::Binance;
pub use bitfinex::Bitfinex;
pub use bitget::Bitget;
pub use bitstamp::Bitstamp;
pub use bybit::Bybit;
pub use coinbase::Coinbase;
pub use gateio::GateIo;
pub use htx::Htx;
pub use kraken::Kraken;
pub use kucoin::KuCoin;
pub use mexc::Mexc;
pub use okx::Okx;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use crate::error::ExchangeError;
use crate::orderbook::{normalize_levels, PriceLevel};

use super::adapter::{ExchangeAdapter, QuoteMap};
use super::client::get_text;
use super::types::{BookSide, ExchangeId, PriceQuote, TradingPair};

/// Venue-specific knowledge: where to ask and how to read the answer.
pub trait Venue: Send + Sync + 'static {
    /// Canonical venue name.
    fn name(&self) -> &'static str;

    /// Full ticker URL for `pair`.
    fn ticker_url(&self, pair: &TradingPair) -> String;

    /// Extract best bid/ask from a ticker body.
    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError>;

    /// Full depth URL for `pair` asking for at least `levels` rows.
    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String;

    /// Extract one side of the book from a depth body.
    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError>;
}

/// Build the `NoQuote` error for a venue.
pub(crate) fn no_quote(exchange: &str, pair: &TradingPair) -> ExchangeError {
    ExchangeError::NoQuote {
        exchange: exchange.to_string(),
        pair: pair.to_string(),
    }
}

/// Generic public-REST adapter over a [`Venue`].
pub struct RestExchange<V> {
    id: ExchangeId,
    venue: V,
    http: reqwest::Client,
    concurrency: usize,
}

impl<V: Venue> RestExchange<V> {
    /// Wrap `venue`, sharing `http` and fetching up to `concurrency` pairs at once.
    pub fn new(venue: V, http: reqwest::Client, concurrency: usize) -> Self {
        Self {
            id: ExchangeId::new(venue.name()),
            venue,
            http,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch and parse a single ticker.
    #[instrument(skip(self), fields(exchange = %self.id, pair = %pair))]
    async fn fetch_quote(&self, pair: &TradingPair) -> Result<PriceQuote, ExchangeError> {
        let url = self.venue.ticker_url(pair);
        let body = get_text(&self.http, self.venue.name(), &url).await?;
        self.venue.parse_ticker(pair, &body)
    }
}

#[async_trait]
impl<V: Venue> ExchangeAdapter for RestExchange<V> {
    fn id(&self) -> &ExchangeId {
        &self.id
    }

    async fn fetch_quotes(&self, pairs: &[TradingPair]) -> QuoteMap {
        let results: Vec<(TradingPair, Result<PriceQuote, ExchangeError>)> =
            stream::iter(pairs.iter().cloned())
                .map(|pair| async move {
                    let result = self.fetch_quote(&pair).await;
                    (pair, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut quotes = QuoteMap::with_capacity(results.len());
        for (pair, result) in results {
            match result {
                Ok(quote) => {
                    quotes.insert(pair, quote);
                }
                Err(e @ (ExchangeError::NoQuote { .. } | ExchangeError::Api { .. })) => {
                    debug!(exchange = %self.id, pair = %pair, error = %e, "Pair not quoted");
                }
                Err(e) => {
                    warn!(exchange = %self.id, pair = %pair, error = %e, "Ticker fetch failed");
                }
            }
        }

        debug!(
            exchange = %self.id,
            quoted = quotes.len(),
            requested = pairs.len(),
            "Quotes fetched"
        );
        quotes
    }

    #[instrument(skip(self), fields(exchange = %self.id, pair = %pair, side = %side))]
    async fn fetch_depth(
        &self,
        pair: &TradingPair,
        side: BookSide,
        levels: usize,
    ) -> Result<Vec<PriceLevel>, ExchangeError> {
        let url = self.venue.depth_url(pair, levels);
        let body = get_text(&self.http, self.venue.name(), &url).await?;
        let mut book = normalize_levels(self.venue.parse_depth(&body, side)?, side);
        book.truncate(levels);
        Ok(book)
    }
}
