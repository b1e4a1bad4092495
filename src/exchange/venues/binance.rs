//! Binance spot.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BookTicker {
    bid_price: Option<Num>,
    ask_price: Option<Num>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Depth {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// `/api/v3/ticker/bookTicker` payload, shared with MEXC.
pub(super) fn parse_book_ticker(
    exchange: &str,
    pair: &TradingPair,
    body: &str,
) -> Result<PriceQuote, ExchangeError> {
    let ticker: BookTicker = decode(exchange, body)?;
    PriceQuote::from_ticker(opt_decimal(&ticker.bid_price), opt_decimal(&ticker.ask_price), None)
        .ok_or_else(|| no_quote(exchange, pair))
}

/// `/api/v3/depth` payload, shared with MEXC.
pub(super) fn parse_depth_payload(
    exchange: &str,
    body: &str,
    side: BookSide,
) -> Result<Vec<PriceLevel>, ExchangeError> {
    let depth: Depth = decode(exchange, body)?;
    Ok(match side {
        BookSide::Bids => parse_levels(&depth.bids),
        BookSide::Asks => parse_levels(&depth.asks),
    })
}

/// Binance public market data.
#[derive(Debug, Clone)]
pub struct Binance {
    base_url: String,
}

impl Default for Binance {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
        }
    }
}

impl Venue for Binance {
    fn name(&self) -> &'static str {
        "binance"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!(
            "{}/api/v3/ticker/bookTicker?symbol={}",
            self.base_url,
            pair.joined("")
        )
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        parse_book_ticker(self.name(), pair, body)
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        format!(
            "{}/api/v3/depth?symbol={}&limit={}",
            self.base_url,
            pair.joined(""),
            levels.clamp(1, 5000)
        )
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        parse_depth_payload(self.name(), body, side)
    }
}
