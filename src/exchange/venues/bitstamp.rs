//! Bitstamp v2.

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
    last: Option<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    bids: Vec<Vec<Num>>,
    #[serde(default)]
    asks: Vec<Vec<Num>>,
}

/// Bitstamp public market data.
#[derive(Debug, Clone)]
pub struct Bitstamp {
    base_url: String,
}

impl Default for Bitstamp {
    fn default() -> Self {
        Self {
            base_url: "https://www.bitstamp.net".to_string(),
        }
    }
}

impl Venue for Bitstamp {
    fn name(&self) -> &'static str {
        "bitstamp"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!(
            "{}/api/v2/ticker/{}/",
            self.base_url,
            pair.joined("").to_lowercase()
        )
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let ticker: Ticker = decode(self.name(), body)?;
        PriceQuote::from_ticker(
            opt_decimal(&ticker.bid),
            opt_decimal(&ticker.ask),
            opt_decimal(&ticker.last),
        )
        .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, _levels: usize) -> String {
        format!(
            "{}/api/v2/order_book/{}/",
            self.base_url,
            pair.joined("").to_lowercase()
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_ticker() {
        let pair = TradingPair::parse("LTC/USDT").unwrap();
        let body = r#"{"timestamp":"1700000000","open":"70","high":"72","low":"69","last":"71.2","volume":"10","vwap":"71","bid":"71.19","ask":"71.23","side":"0"}"#;
        let venue = Bitstamp::default();
        let quote = venue.parse_ticker(&pair, body).unwrap();
        assert_eq!(quote.bid, dec!(71.19));
        assert_eq!(quote.ask, dec!(71.23));
        assert!(venue.ticker_url(&pair).ends_with("/api/v2/ticker/ltcusdt/"));
    }

    #[test]
    fn parses_order_book() {
        let body = r#"{"timestamp":"1","microtimestamp":"1","bids":[["71.19","3.5"]],"asks":[["71.23","1.0"],["71.30","4"]]}"#;
        let asks = Bitstamp::default().parse_depth(body, BookSide::Asks).unwrap();
        assert_eq!(asks.len(), 2);
        assert_eq!(asks[0].price, dec!(71.23));
    }
}
