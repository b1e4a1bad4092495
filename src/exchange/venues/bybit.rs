//! Bybit v5 spot.

use serde::Deserialize;

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, opt_decimal, parse_levels, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    result: Option<T>,
}

impl<T> Envelope<T> {
    fn into_result(self, exchange: &str) -> Result<T, ExchangeError> {
        if self.ret_code != 0 {
            return Err(ExchangeError::api(exchange, self.ret_msg));
        }
        self.result
            .ok_or_else(|| ExchangeError::parse(exchange, "missing result"))
    }
}

#[derive(Debug, Deserialize)]
struct TickerList {
    #[serde(default)]
    list: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker {
    bid1_price: Option<Num>,
    ask1_price: Option<Num>,
    last_price: Option<Num>,
}

#[derive(Debug, Deserialize)]
struct Book {
    #[serde(default)]
    b: Vec<Vec<Num>>,
    #[serde(default)]
    a: Vec<Vec<Num>>,
}

/// Bybit public market data.
#[derive(Debug, Clone)]
pub struct Bybit {
    base_url: String,
}

impl Default for Bybit {
    fn default() -> Self {
        Self {
            base_url: "https://api.bybit.com".to_string(),
        }
    }
}

impl Venue for Bybit {
    fn name(&self) -> &'static str {
        "bybit"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!(
            "{}/v5/market/tickers?category=spot&symbol={}",
            self.base_url,
            pair.joined("")
        )
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let envelope: Envelope<TickerList> = decode(self.name(), body)?;
        let ticker = envelope
            .into_result(self.name())?
            .list
            .into_iter()
            .next()
            .ok_or_else(|| no_quote(self.name(), pair))?;

        PriceQuote::from_ticker(
            opt_decimal(&ticker.bid1_price),
            opt_decimal(&ticker.ask1_price),
            opt_decimal(&ticker.last_price),
        )
        .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        format!(
            "{}/v5/market/orderbook?category=spot&symbol={}&limit={}",
            self.base_url,
            pair.joined(""),
            levels.clamp(1, 200)
        )
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        let envelope: Envelope<Book> = decode(self.name(), body)?;
        let book = envelope.into_result(self.name())?;
        Ok(match side {
            BookSide::Bids => parse_levels(&book.b),
            BookSide::Asks => parse_levels(&book.a),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eth() -> TradingPair {
        TradingPair::parse("ETH/USDT").unwrap()
    }

    #[test]
    fn parses_spot_ticker() {
        let body = r#"{"retCode":0,"retMsg":"OK","result":{"category":"spot","list":[
            {"symbol":"ETHUSDT","bid1Price":"3100.5","bid1Size":"1","ask1Price":"3100.6","ask1Size":"2","lastPrice":"3100.55"}
        ]},"time":1700000000000}"#;
        let quote = Bybit::default().parse_ticker(&eth(), body).unwrap();
        assert_eq!(quote.bid, dec!(3100.5));
        assert_eq!(quote.ask, dec!(3100.6));
    }

    #[test]
    fn empty_bid_falls_back_to_last() {
        let body = r#"{"retCode":0,"retMsg":"OK","result":{"list":[
            {"symbol":"ETHUSDT","bid1Price":"","ask1Price":"3100.6","lastPrice":"3100.55"}
        ]}}"#;
        let quote = Bybit::default().parse_ticker(&eth(), body).unwrap();
        assert_eq!(quote.bid, dec!(3100.55));
    }

    #[test]
    fn api_error_is_reported() {
        let body = r#"{"retCode":10001,"retMsg":"Not supported symbols","result":{}}"#;
        let err = Bybit::default().parse_ticker(&eth(), body).unwrap_err();
        assert!(matches!(err, ExchangeError::Api { .. }));
    }

    #[test]
    fn parses_orderbook() {
        let body = r#"{"retCode":0,"retMsg":"OK","result":{"s":"ETHUSDT","b":[["3100.5","1.5"]],"a":[["3100.6","0.2"],["3100.7","3"]],"ts":1}}"#;
        let asks = Bybit::default().parse_depth(body, BookSide::Asks).unwrap();
        assert_eq!(asks.len(), 2);
        assert_eq!(asks[0], PriceLevel::new(dec!(3100.6), dec!(0.2)));
    }
}
