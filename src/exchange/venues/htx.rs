//! HTX (formerly Huobi) spot.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(rename = "err-msg")]
    err_msg: Option<String>,
    tick: Option<T>,
}

impl<T> Envelope<T> {
    fn into_tick(self, exchange: &str) -> Result<Option<T>, ExchangeError> {
        if self.status != "ok" {
            let msg = self.err_msg.unwrap_or(self.status);
            return Err(ExchangeError::api(exchange, msg));
        }
        Ok(self.tick)
    }
}

#[derive(Debug, Deserialize)]
struct Merged {
    /// `[price, size]`
    #[serde(default)]
    bid: Vec<Num>,
    #[serde(default)]
    ask: Vec<Num>,
    close: Option<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

fn symbol(pair: &TradingPair) -> String {
    pair.joined("").to_lowercase()
}

/// HTX public market data.
#[derive(Debug, Clone)]
pub struct Htx {
    base_url: String,
}

impl Default for Htx {
    fn default() -> Self {
        Self {
            base_url: "https://api.huobi.pro".to_string(),
        }
    }
}

impl Venue for Htx {
    fn name(&self) -> &'static str {
        "htx"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!("{}/market/detail/merged?symbol={}", self.base_url, symbol(pair))
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let envelope: Envelope<Merged> = decode(self.name(), body)?;
        let tick = envelope
            .into_tick(self.name())?
            .ok_or_else(|| no_quote(self.name(), pair))?;

        let head = |v: &[Num]| v.first().and_then(Num::decimal);
        PriceQuote::from_ticker(head(&tick.bid), head(&tick.ask), opt_decimal(&tick.close))
            .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        let depth = match levels {
            0..=5 => 5,
            6..=10 => 10,
            _ => 20,
        };
        format!(
            "{}/market/depth?symbol={}&type=step0&depth={}",
            self.base_url,
            symbol(pair),
            depth
        )
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        let envelope: Envelope<Book> = decode(self.name(), body)?;
        let Some(book) = envelope.into_tick(self.name())? else {
            return Ok(Vec::new());
        };
        Ok(match side {
            BookSide::Bids => parse_levels(&book.bids),
            BookSide::Asks => parse_levels(&book.asks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc() -> TradingPair {
        TradingPair::parse("BTC/USDT").unwrap()
    }

    #[test]
    fn uses_lowercase_symbol() {
        assert!(Htx::default().ticker_url(&btc()).ends_with("symbol=btcusdt"));
        assert!(Htx::default().depth_url(&btc(), 5).ends_with("depth=5"));
    }

    #[test]
    fn parses_merged_ticker() {
        let body = r#"{"ch":"market.btcusdt.detail.merged","status":"ok","ts":1,"tick":{"id":1,"close":64000.2,"bid":[64000.1,0.5],"ask":[64000.3,1.2]}}"#;
        let quote = Htx::default().parse_ticker(&btc(), body).unwrap();
        assert_eq!(quote.bid, dec!(64000.1));
        assert_eq!(quote.ask, dec!(64000.3));
    }

    #[test]
    fn error_status_is_api_error() {
        let body = r#"{"status":"error","err-code":"invalid-parameter","err-msg":"invalid symbol","data":null}"#;
        let err = Htx::default().parse_ticker(&btc(), body).unwrap_err();
        assert!(matches!(err, ExchangeError::Api { .. }));
    }

    #[test]
    fn parses_numeric_depth() {
        let body = r#"{"status":"ok","tick":{"bids":[[64000.1,0.5],[64000.0,2]],"asks":[[64000.3,1.2]]}}"#;
        let bids = Htx::default().parse_depth(body, BookSide::Bids).unwrap();
        assert_eq!(bids[1], PriceLevel::new(dec!(64000), dec!(2)));
    }
}
