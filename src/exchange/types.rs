//! Exchange-facing value types shared by adapters and the evaluator.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use strum::{Display, EnumString};

static PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z0-9]+)/([A-Z0-9]+)$").expect("valid regex"));

/// Lower-case venue identifier (e.g. `binance`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ExchangeId(String);

impl ExchangeId {
    /// Build an id, trimming and lower-casing the input.
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_lowercase())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExchangeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A `BASE/QUOTE` trading pair, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradingPair {
    base: String,
    quote: String,
}

impl TradingPair {
    /// Parse `btc/usdt` or `BTC/USDT`. Returns `None` for anything else.
    pub fn parse(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_uppercase();
        let caps = PAIR_RE.captures(&upper)?;
        Some(Self {
            base: caps[1].to_string(),
            quote: caps[2].to_string(),
        })
    }

    /// Base asset, e.g. `BTC`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset, e.g. `USDT`.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Symbol joined with a venue-specific separator, e.g. `BTC-USDT`.
    pub fn joined(&self, sep: &str) -> String {
        format!("{}{}{}", self.base, sep, self.quote)
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl Serialize for TradingPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Best bid and best ask for one pair on one venue.
///
/// Both prices are strictly positive. `bid <= ask` is not enforced; crossed
/// books are passed through as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    /// Highest price a buyer will pay.
    pub bid: Decimal,
    /// Lowest price a seller will accept.
    pub ask: Decimal,
}

impl PriceQuote {
    /// Create a quote, rejecting non-positive prices.
    pub fn new(bid: Decimal, ask: Decimal) -> Option<Self> {
        if bid <= Decimal::ZERO || ask <= Decimal::ZERO {
            return None;
        }
        Some(Self { bid, ask })
    }

    /// Build a quote from a ticker where bid or ask may be missing.
    ///
    /// A missing or non-positive side falls back to the last trade price.
    pub fn from_ticker(
        bid: Option<Decimal>,
        ask: Option<Decimal>,
        last: Option<Decimal>,
    ) -> Option<Self> {
        let positive = |v: Option<Decimal>| v.filter(|p| *p > Decimal::ZERO);
        let last = positive(last);
        let bid = positive(bid).or(last)?;
        let ask = positive(ask).or(last)?;
        Self::new(bid, ask)
    }
}

/// Which side of an order book to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BookSide {
    /// Resting buy orders; what a seller hits.
    Bids,
    /// Resting sell orders; what a buyer lifts.
    Asks,
}
