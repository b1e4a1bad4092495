//! Book depth aggregation.

use rust_decimal::Decimal;

use super::types::PriceLevel;

/// Sum `price × size` over the first `levels` entries.
///
/// Returns `None` for an empty book so callers can tell "no data" apart from
/// "zero liquidity".
pub fn depth_usd(book: &[PriceLevel], levels: usize) -> Option<Decimal> {
    if book.is_empty() {
        return None;
    }
    Some(book.iter().take(levels).map(PriceLevel::notional).sum())
}
