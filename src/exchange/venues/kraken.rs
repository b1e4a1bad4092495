//! Kraken spot.
//!
//! Kraken keys results by its own pair name (`XBTUSDT`, `XXBTZUSD`), so the
//! parsers take the first entry instead of looking the key up.

use std::collections::HashMap;

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: Vec<String>,
    result: Option<HashMap<String, T>>,
}

impl<T> Envelope<T> {
    fn first(self, exchange: &str) -> Result<Option<T>, ExchangeError> {
        if !self.error.is_empty() {
            return Err(ExchangeError::api(exchange, self.error.join("; ")));
        }
        Ok(self.result.and_then(|r| r.into_values().next()))
    }
}

#[derive(Debug, Deserialize)]
struct Ticker {
    /// `[price, whole lot volume, lot volume]`
    #[serde(default)]
    a: Vec<Num>,
    #[serde(default)]
    b: Vec<Num>,
    /// `[price, lot volume]` of the last trade.
    #[serde(default)]
    c: Vec<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// Kraken's legacy asset codes.
fn asset_code(asset: &str) -> &str {
    match asset {
        "BTC" => "XBT",
        "DOGE" => "XDG",
        other => other,
    }
}

fn symbol(pair: &TradingPair) -> String {
    format!("{}{}", asset_code(pair.base()), asset_code(pair.quote()))
}

/// Kraken public market data.
#[derive(Debug, Clone)]
pub struct Kraken {
    base_url: String,
}

impl Default for Kraken {
    fn default() -> Self {
        Self {
            base_url: "https://api.kraken.com".to_string(),
        }
    }
}

impl Venue for Kraken {
    fn name(&self) -> &'static str {
        "kraken"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!("{}/0/public/Ticker?pair={}", self.base_url, symbol(pair))
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let envelope: Envelope<Ticker> = decode(self.name(), body)?;
        let ticker = envelope
            .first(self.name())?
            .ok_or_else(|| no_quote(self.name(), pair))?;

        let head = |v: &[Num]| v.first().and_then(Num::decimal);
        PriceQuote::from_ticker(head(&ticker.b), head(&ticker.a), head(&ticker.c))
            .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        format!(
            "{}/0/public/Depth?pair={}&count={}",
            self.base_url,
            symbol(pair),
            levels.clamp(1, 500)
        )
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        let envelope: Envelope<Book> = decode(self.name(), body)?;
        let Some(book) = envelope.first(self.name())? else {
            return Ok(Vec::new());
        };
        Ok(match side {
            BookSide::Bids => parse_levels(&book.bids),
            BookSide::Asks => parse_levels(&book.asks),
        })
    }
}
