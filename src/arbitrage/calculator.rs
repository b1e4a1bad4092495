//! Fee-adjusted spread calculation.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::exchange::{ExchangeId, TradingPair};

/// Fee-adjusted prices for one buy/sell comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetSpread {
    /// Cost of buying one unit including the taker fee.
    pub effective_buy: Decimal,
    /// Proceeds of selling one unit after the taker fee.
    pub effective_sell: Decimal,
    /// `(effective_sell - effective_buy) / effective_buy`.
    pub spread: Decimal,
}

/// Compute the net relative spread of buying at `buy_ask` and selling at `sell_bid`.
///
/// Fees are percentages (`0.1` means 0.1%). Returns `None` when either price is
/// non-positive or the fee-adjusted buy cost is not positive.
pub fn net_spread(
    buy_ask: Decimal,
    buy_fee_pct: Decimal,
    sell_bid: Decimal,
    sell_fee_pct: Decimal,
) -> Option<NetSpread> {
    if buy_ask <= Decimal::ZERO || sell_bid <= Decimal::ZERO {
        return None;
    }

    let effective_buy = buy_ask * (Decimal::ONE + buy_fee_pct / Decimal::ONE_HUNDRED);
    let effective_sell = sell_bid * (Decimal::ONE - sell_fee_pct / Decimal::ONE_HUNDRED);
    if effective_buy <= Decimal::ZERO {
        return None;
    }

    let spread = (effective_sell - effective_buy).checked_div(effective_buy)?;
    Some(NetSpread {
        effective_buy,
        effective_sell,
        spread,
    })
}

/// An alert-worthy cross-exchange price gap.
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    /// Pair being compared.
    pub pair: TradingPair,
    /// Venue to buy on (its ask).
    pub buy_exchange: ExchangeId,
    /// Best ask on the buy venue.
    pub buy_price: Decimal,
    /// Buy venue fee percent.
    pub buy_fee: Decimal,
    /// Venue to sell on (its bid).
    pub sell_exchange: ExchangeId,
    /// Best bid on the sell venue.
    pub sell_price: Decimal,
    /// Sell venue fee percent.
    pub sell_fee: Decimal,
    /// Net spread as a fraction.
    pub net_spread: Decimal,
    /// USD depth on the buy venue's ask side, when checked.
    pub buy_liquidity_usd: Option<Decimal>,
    /// USD depth on the sell venue's bid side, when checked.
    pub sell_liquidity_usd: Option<Decimal>,
    /// When the opportunity was found.
    #[serde(with = "time::serde::rfc3339")]
    pub detected_at: OffsetDateTime,
}

impl ArbitrageOpportunity {
    /// Net spread in percent.
    pub fn net_profit_pct(&self) -> Decimal {
        self.net_spread * Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reference_example() {
        let s = net_spread(dec!(100), dec!(0.1), dec!(100.5), dec!(0.1)).unwrap();
        assert_eq!(s.effective_buy, dec!(100.1));
        assert_eq!(s.effective_sell, dec!(100.3995));
        // 0.2995 / 100.1
        assert!(s.spread > dec!(0.002991) && s.spread < dec!(0.002993));
    }

    #[test]
    fn zero_fees_give_raw_spread() {
        let s = net_spread(dec!(100), dec!(0), dec!(101), dec!(0)).unwrap();
        assert_eq!(s.spread, dec!(0.01));
    }

    #[test]
    fn negative_spread_is_reported() {
        let s = net_spread(dec!(101), dec!(0), dec!(100), dec!(0)).unwrap();
        assert!(s.spread < Decimal::ZERO);
    }

    #[test]
    fn non_positive_prices_are_guarded() {
        assert!(net_spread(dec!(0), dec!(0.1), dec!(100), dec!(0.1)).is_none());
        assert!(net_spread(dec!(-1), dec!(0.1), dec!(100), dec!(0.1)).is_none());
        assert!(net_spread(dec!(100), dec!(0.1), dec!(0), dec!(0.1)).is_none());
    }

    #[test]
    fn fee_wiping_out_buy_cost_is_guarded() {
        assert!(net_spread(dec!(100), dec!(-100), dec!(100), dec!(0)).is_none());
    }

    #[test]
    fn profit_pct_scales_fraction() {
        let opp = ArbitrageOpportunity {
            pair: TradingPair::parse("BTC/USDT").unwrap(),
            buy_exchange: ExchangeId::new("binance"),
            buy_price: dec!(100),
            buy_fee: dec!(0.1),
            sell_exchange: ExchangeId::new("okx"),
            sell_price: dec!(100.5),
            sell_fee: dec!(0.1),
            net_spread: dec!(0.003),
            buy_liquidity_usd: None,
            sell_liquidity_usd: None,
            detected_at: OffsetDateTime::now_utc(),
        };
        assert_eq!(opp.net_profit_pct(), dec!(0.3));
    }
}
