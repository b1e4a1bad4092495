//! Coinbase Exchange.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

#[derive(Debug, Deserialize)]
struct Ticker {
    bid: Option<Num>,
    ask: Option<Num>,
    price: Option<Num>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// Coinbase Exchange public market data.
#[derive(Debug, Clone)]
pub struct Coinbase {
    base_url: String,
}

impl Default for Coinbase {
    fn default() -> Self {
        Self {
            base_url: "https://api.exchange.coinbase.com".to_string(),
        }
    }
}

impl Venue for Coinbase {
    fn name(&self) -> &'static str {
        "coinbase"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!("{}/products/{}/ticker", self.base_url, pair.joined("-"))
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let ticker: Ticker = decode(self.name(), body)?;
        if let Some(message) = ticker.message {
            return Err(ExchangeError::api(self.name(), message));
        }

        PriceQuote::from_ticker(
            opt_decimal(&ticker.bid),
            opt_decimal(&ticker.ask),
            opt_decimal(&ticker.price),
        )
        .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, _levels: usize) -> String {
        // Level 2 always returns the aggregated top 50.
        format!("{}/products/{}/book?level=2", self.base_url, pair.joined("-"))
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        let book: Book = decode(self.name(), body)?;
        Ok(match side {
            BookSide::Bids => parse_levels(&book.bids),
            BookSide::Asks => parse_levels(&book.asks),
        })
    }
}
