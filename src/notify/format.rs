//! Message text builders.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::arbitrage::ArbitrageOpportunity;

/// Third-party monitor alert accepted by the relay endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RelayAlert {
    /// Kind of alert, e.g. `down` or `up`.
    pub alert_type: String,
    /// Name of the monitor that fired.
    pub monitor_name: String,
    /// Free-form details.
    #[serde(default)]
    pub details: String,
}

/// Trailing zeros off, so `64000.01000000` prints as `64000.01`.
fn plain(value: Decimal) -> Decimal {
    value.normalize()
}

/// Markdown alert for an opportunity.
pub fn format_opportunity(opp: &ArbitrageOpportunity, orderbook_levels: usize) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "🔁 *Arbitrage Opportunity!*");
    let _ = writeln!(text, "*Pair:* `{}`", opp.pair);
    let _ = writeln!(
        text,
        "*Buy:* {} at {} (fee {}%)",
        opp.buy_exchange,
        plain(opp.buy_price),
        plain(opp.buy_fee)
    );
    let _ = writeln!(
        text,
        "*Sell:* {} at {} (fee {}%)",
        opp.sell_exchange,
        plain(opp.sell_price),
        plain(opp.sell_fee)
    );
    let _ = write!(
        text,
        "*Profit (after fees):* `{:.2}%`",
        opp.net_profit_pct().round_dp(2)
    );
    if let Some(usd) = opp.buy_liquidity_usd {
        let _ = write!(
            text,
            "\n*Buy liquidity (top {}):* {:.2} USD",
            orderbook_levels,
            usd.round_dp(2)
        );
    }
    if let Some(usd) = opp.sell_liquidity_usd {
        let _ = write!(
            text,
            "\n*Sell liquidity (top {}):* {:.2} USD",
            orderbook_levels,
            usd.round_dp(2)
        );
    }
    text
}

/// Plain-text relay of a third-party alert.
pub fn format_relay_alert(alert: &RelayAlert) -> String {
    let mut text = format!(
        "⚠️ Alert: {}\nMonitor: {}",
        alert.alert_type.trim(),
        alert.monitor_name.trim()
    );
    let details = alert.details.trim();
    if !details.is_empty() {
        text.push('\n');
        text.push_str(details);
    }
    text
}
