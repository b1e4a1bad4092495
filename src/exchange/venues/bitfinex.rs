//! Bitfinex v2 public API.
//!
//! Responses are positional arrays. Book rows are `[price, count, amount]`
//! with a positive amount for bids and a negative amount for asks.

use super::{no_quote, Venue};
use crate::error::ExchangeError;
use crate::exchange::client::{decode, Num};
use crate::exchange::{BookSide, PriceQuote, TradingPair};
use crate::orderbook::PriceLevel;

const BID: usize = 0;
const ASK: usize = 2;
const LAST_PRICE: usize = 6;

fn currency(asset: &str) -> &str {
    match asset {
        "USDT" => "UST",
        other => other,
    }
}

fn symbol(pair: &TradingPair) -> String {
    let base = currency(pair.base());
    let quote = currency(pair.quote());
    if base.len() > 3 || quote.len() > 3 {
        format!("t{}:{}", base, quote)
    } else {
        format!("t{}{}", base, quote)
    }
}

/// `["error", code, message]`
fn api_error(exchange: &str, row: &[Num]) -> Option<ExchangeError> {
    match row.first() {
        Some(Num::Text(tag)) if tag == "error" => {
            let message = match row.get(2) {
                Some(Num::Text(msg)) => msg.clone(),
                _ => "unknown error".to_string(),
            };
            Some(ExchangeError::api(exchange, message))
        }
        _ => None,
    }
}

/// Bitfinex public market data.
#[derive(Debug, Clone)]
pub struct Bitfinex {
    base_url: String,
}

impl Default for Bitfinex {
    fn default() -> Self {
        Self {
            base_url: "https://api-pub.bitfinex.com".to_string(),
        }
    }
}

impl Venue for Bitfinex {
    fn name(&self) -> &'static str {
        "bitfinex"
    }

    fn ticker_url(&self, pair: &TradingPair) -> String {
        format!("{}/v2/ticker/{}", self.base_url, symbol(pair))
    }

    fn parse_ticker(&self, pair: &TradingPair, body: &str) -> Result<PriceQuote, ExchangeError> {
        let row: Vec<Num> = decode(self.name(), body)?;
        if let Some(err) = api_error(self.name(), &row) {
            return Err(err);
        }

        let field = |i: usize| row.get(i).and_then(Num::decimal);
        PriceQuote::from_ticker(field(BID), field(ASK), field(LAST_PRICE))
            .ok_or_else(|| no_quote(self.name(), pair))
    }

    fn depth_url(&self, pair: &TradingPair, levels: usize) -> String {
        let len = if levels <= 25 { 25 } else { 100 };
        format!("{}/v2/book/{}/P0?len={}", self.base_url, symbol(pair), len)
    }

    fn parse_depth(&self, body: &str, side: BookSide) -> Result<Vec<PriceLevel>, ExchangeError> {
        let rows: Vec<Vec<Num>> = decode(self.name(), body).map_err(|e| {
            // Errors come back as a flat array, not a list of rows.
            match decode::<Vec<Num>>(self.name(), body) {
                Ok(row) => api_error(self.name(), &row).unwrap_or(e),
                Err(_) => e,
            }
        })?;

        let levels = rows
            .iter()
            .filter_map(|row| {
                let price = row.first()?.decimal()?;
                let amount = row.get(2)?.decimal()?;
                let keep = match side {
                    BookSide::Bids => amount.is_sign_positive(),
                    BookSide::Asks => amount.is_sign_negative(),
                };
                keep.then(|| PriceLevel::new(price, amount.abs()))
            })
            .collect();
        Ok(levels)
    }
}
