//! Bitget v2 spot.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

const OK: &str = "00000";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self, exchange: &str) -> Result<Option<T>, ExchangeError> {
        if self.code != OK {
            return Err(ExchangeError::api(exchange, format!("{} {}", self.code, self.msg)));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    bid_pr: Option<Num>,
    ask_pr: Option<Num>,
    last_pr: Option<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// Bitget public market data.
#[derive(Debug, Clone)]
pub struct Bitget {
    base_url: String,
}

impl Default for Bitget {
    fn default() -> Self {
        Self {
            base_url: "https://api.bitget.com".to_string(),
        }
    }
}

impl Venue for Bitget {
    fn name(&self) -> &'static str {
        "bitget"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!(
            "{}/api/v2/spot/market/tickers?symbol={}",
            self.base_url,
            pair.joined("")
        )
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let envelope: Envelope<Vec<Ticker>> = decode(self.name(), body)?;
        let ticker = envelope
            .into_data(self.name())?
            .and_then(|list| list.into_iter().next())
            .ok_or_else(|| no_quote(self.name(), pair))?;

        PriceQuote::from_ticker(
            opt_decimal(&ticker.bid_pr),
            opt_decimal(&ticker.ask_pr),
            opt_decimal(&ticker.last_pr),
        )
        .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        format!(
            "{}/api/v2/spot/market/orderbook?symbol={}&type=step0&limit={}",
            self.base_url,
            pair.joined(""),
            levels.clamp(1, 150)
        )
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        let envelope: Envelope<Book> = decode(self.name(), body)?;
        let Some(book) = envelope.into_data(self.name())? else {
            return Ok(Vec::new());
        };
        Ok(match side {
            BookSide::Bids => parse_levels(&book.bids),
            BookSide::Asks => parse_levels(&book.asks),
        })
    }
}
