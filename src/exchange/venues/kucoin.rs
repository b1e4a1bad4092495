//! KuCoin spot.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

const OK: &str = "200000";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self, exchange: &str) -> Result<Option<T>, ExchangeError> {
        if self.code != OK {
            let msg = self.msg.unwrap_or_default();
            return Err(ExchangeError::api(exchange, format!("{} {}", self.code, msg)));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Level1 {
    best_bid: Option<Num>,
    best_ask: Option<Num>,
    price: Option<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// KuCoin public market data.
#[derive(Debug, Clone)]
pub struct KuCoin {
    base_url: String,
}

impl Default for KuCoin {
    fn default() -> Self {
        Self {
            base_url: "https://api.kucoin.com".to_string(),
        }
    }
}

impl Venue for KuCoin {
    fn name(&self) -> &'static str {
        "kucoin"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!(
            "{}/api/v1/market/orderbook/level1?symbol={}",
            self.base_url,
            pair.joined("-")
        )
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let envelope: Envelope<Level1> = decode(self.name(), body)?;
        let level1 = envelope
            .into_data(self.name())?
            .ok_or_else(|| no_quote(self.name(), pair))?;

        PriceQuote::from_ticker(
            opt_decimal(&level1.best_bid),
            opt_decimal(&level1.best_ask),
            opt_decimal(&level1.price),
        )
        .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        // Only two public snapshot sizes exist.
        let size = if levels <= 20 { 20 } else { 100 };
        format!(
            "{}/api/v1/market/orderbook/level2_{}?symbol={}",
            self.base_url,
            size,
            pair.joined("-")
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
