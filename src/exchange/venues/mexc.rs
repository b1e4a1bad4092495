//! MEXC spot. Same v3 REST shapes as Binance.

use super::binance::{parse_book_ticker, parse_depth_payload};
use super::Venue;
use crate::error::ExchangeError;
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

/// MEXC public market data.
#[derive(Debug, Clone)]
pub struct Mexc {
    base_url: String,
}

impl Default for Mexc {
    fn default() -> Self {
        Self {
            base_url: "https://api.mexc.com".to_string(),
        }
    }
}

impl Venue for Mexc {
    fn name(&self) -> &'static str {
        "mexc"
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
