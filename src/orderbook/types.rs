//! Order book level types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::exchange::BookSide;

/// Single price level in an order book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price at this level.
    pub price: Decimal,
    /// Base-asset amount resting at this price.
    pub size: Decimal,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Quote-currency notional of this level.
    pub fn notional(&self) -> Decimal {
        self.price * self.size
    }
}

/// Drop empty or non-positive levels and order them best-first for `side`.
///
/// Bids end up descending by price, asks ascending. Venues normally return
/// them that way already; Bitfinex and Kraken mix or reverse them.
pub fn normalize_levels(mut levels: Vec<PriceLevel>, side: BookSide) -> Vec<PriceLevel> {
    levels.retain(|l| l.price > Decimal::ZERO && l.size > Decimal::ZERO);
    match side {
        BookSide::Bids => levels.sort_by(|a, b| b.price.cmp(&a.price)),
        BookSide::Asks => levels.sort_by(|a, b| a.price.cmp(&b.price)),
    }
    levels
}
