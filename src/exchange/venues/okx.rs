//! OKX v5 spot.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl<T> Envelope<T> {
    fn first(self, exchange: &str) -> Result<Option<T>, ExchangeError> {
        if self.code != "0" {
            return Err(ExchangeError::api(exchange, format!("{} {}", self.code, self.msg)));
        }
        Ok(self.data.into_iter().next())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    bid_px: Option<Num>,
    ask_px: Option<Num>,
    last: Option<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// OKX public market data.
#[derive(Debug, Clone)]
pub struct Okx {
    base_url: String,
}

impl Default for Okx {
    fn default() -> Self {
        Self {
            base_url: "https://www.okx.com".to_string(),
        }
    }
}

impl Venue for Okx {
    fn name(&self) -> &'static str {
        "okx"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!("{}/api/v5/market/ticker?instId={}", self.base_url, pair.joined("-"))
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let envelope: Envelope<Ticker> = decode(self.name(), body)?;
        let ticker = envelope
            .first(self.name())?
            .ok_or_else(|| no_quote(self.name(), pair))?;

        PriceQuote::from_ticker(
            opt_decimal(&ticker.bid_px),
            opt_decimal(&ticker.ask_px),
            opt_decimal(&ticker.last),
        )
        .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        format!(
            "{}/api/v5/market/books?instId={}&sz={}",
            self.base_url,
            pair.joined("-"),
            levels.clamp(1, 400)
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
