//! Gate.io v4 spot.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

#[derive(Debug, Deserialize)]
struct Ticker {
    highest_bid: Option<Num>,
    lowest_ask: Option<Num>,
    last: Option<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// Gate.io public market data.
#[derive(Debug, Clone)]
pub struct GateIo {
    base_url: String,
}

impl Default for GateIo {
    fn default() -> Self {
        Self {
            base_url: "https://api.gateio.ws".to_string(),
        }
    }
}

impl Venue for GateIo {
    fn name(&self) -> &'static str {
        "gateio"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!(
            "{}/api/v4/spot/tickers?currency_pair={}",
            self.base_url,
            pair.joined("_")
        )
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let tickers: Vec<Ticker> = decode(self.name(), body)?;
        let ticker = tickers
            .into_iter()
            .next()
            .ok_or_else(|| no_quote(self.name(), pair))?;

        PriceQuote::from_ticker(
            opt_decimal(&ticker.highest_bid),
            opt_decimal(&ticker.lowest_ask),
            opt_decimal(&ticker.last),
        )
        .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        format!(
            "{}/api/v4/spot/order_book?currency_pair={}&limit={}",
            self.base_url,
            pair.joined("_"),
            levels.clamp(1, 100)
        )
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        let book: Book = decode(self.name(), body)?;
        Ok(match side {
            BookSide::Bids => parse_levels(&book.bids),
            BookSide::Asks => parse_levels(&book.asks),
        })
    }
}
