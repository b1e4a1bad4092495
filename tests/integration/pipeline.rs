//! Fetch, compare, gate and alert across whole cycles.

use std::time::Duration;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use spread_watch::arbitrage::{EvaluatorConfig, LiquidityPolicy};
use spread_watch::exchange::{BookSide, ExchangeId, MockExchange};
use spread_watch::orderbook::PriceLevel;

use crate::{harness, no_liquidity};

const WINDOW: Duration = Duration::from_secs(300);

fn binance_okx() -> (MockExchange, MockExchange) {
    (
        MockExchange::new("binance").quote("BTC/USDT", dec!(99.9), dec!(100)),
        MockExchange::new("okx").quote("BTC/USDT", dec!(100.5), dec!(100.6)),
    )
}

#[tokio::test]
async fn worked_example_alerts_with_fees() {
    let (binance, okx) = binance_okx();
    let h = harness(
        &[&binance, &okx],
        no_liquidity(),
        &[("binance", dec!(0.1)), ("okx", dec!(0.1))],
        WINDOW,
    );

    let report = h.scanner.run_cycle().await;

    assert_eq!(report.comparisons, 2);
    assert_eq!(report.alerts, 1);
    assert_eq!(
        h.sink.texts(),
        vec![
            "🔁 *Arbitrage Opportunity!*\n\
             *Pair:* `BTC/USDT`\n\
             *Buy:* binance at 100 (fee 0.1%)\n\
             *Sell:* okx at 100.5 (fee 0.1%)\n\
             *Profit (after fees):* `0.30%`"
        ]
    );
}

#[tokio::test]
async fn one_failing_exchange_leaves_the_rest_comparable() {
    let (binance, okx) = binance_okx();
    let kraken = MockExchange::new("kraken").quote("BTC/USDT", dec!(100), dec!(100.1));
    kraken.set_fail_quotes(true);
    let h = harness(&[&binance, &okx, &kraken], no_liquidity(), &[], WINDOW);

    let report = h.scanner.run_cycle().await;

    assert_eq!(report.exchanges_queried, 3);
    assert_eq!(report.exchanges_responding, 2);
    assert_eq!(report.failed_exchanges, vec![ExchangeId::new("kraken")]);
    assert_eq!(report.comparisons, 2);
    assert_eq!(report.alerts, 1);
}

#[tokio::test]
async fn implausible_spread_is_dropped() {
    let cheap = MockExchange::new("binance").quote("BTC/USDT", dec!(49), dec!(50));
    let dear = MockExchange::new("okx").quote("BTC/USDT", dec!(100), dec!(101));
    let h = harness(&[&cheap, &dear], no_liquidity(), &[], WINDOW);

    let report = h.scanner.run_cycle().await;

    assert_eq!(report.implausible, 1);
    assert_eq!(report.alerts, 0);
    assert!(h.sink.messages().is_empty());
}

#[tokio::test]
async fn thin_book_blocks_alert() {
    let (binance, okx) = binance_okx();
    binance.set_depth(
        "BTC/USDT",
        BookSide::Asks,
        vec![PriceLevel::new(dec!(100), dec!(5))],
    );
    okx.set_depth(
        "BTC/USDT",
        BookSide::Bids,
        vec![PriceLevel::new(dec!(100.5), dec!(5))],
    );
    let h = harness(&[&binance, &okx], EvaluatorConfig::default(), &[], WINDOW);

    let report = h.scanner.run_cycle().await;

    assert_eq!(report.liquidity_rejected, 1);
    assert_eq!(report.alerts, 0);
    assert!(h.sink.messages().is_empty());
}

#[tokio::test]
async fn deep_book_reports_liquidity() {
    let (binance, okx) = binance_okx();
    binance.set_depth(
        "BTC/USDT",
        BookSide::Asks,
        vec![
            PriceLevel::new(dec!(100), dec!(10)),
            PriceLevel::new(dec!(100.1), dec!(10)),
        ],
    );
    okx.set_depth(
        "BTC/USDT",
        BookSide::Bids,
        vec![PriceLevel::new(dec!(100.5), dec!(20))],
    );
    let h = harness(&[&binance, &okx], EvaluatorConfig::default(), &[], WINDOW);

    let report = h.scanner.run_cycle().await;

    assert_eq!(report.alerts, 1);
    let text = &h.sink.texts()[0];
    assert!(text.contains("*Buy liquidity (top 5):* 2001.00 USD"));
    assert!(text.contains("*Sell liquidity (top 5):* 2010.00 USD"));
}

#[tokio::test]
async fn unknown_depth_follows_policy() {
    let (binance, okx) = binance_okx();
    binance.set_fail_depth(true);

    let open = harness(&[&binance, &okx], EvaluatorConfig::default(), &[], WINDOW);
    assert_eq!(open.scanner.run_cycle().await.alerts, 1);
    assert!(!open.sink.texts()[0].contains("liquidity"));

    let closed = harness(
        &[&binance, &okx],
        EvaluatorConfig {
            liquidity_policy: LiquidityPolicy::FailClosed,
            ..EvaluatorConfig::default()
        },
        &[],
        WINDOW,
    );
    let report = closed.scanner.run_cycle().await;
    assert_eq!(report.alerts, 0);
    assert_eq!(report.liquidity_rejected, 1);
}

#[tokio::test]
async fn cooldown_suppresses_within_window_only() {
    let (binance, okx) = binance_okx();
    let h = harness(
        &[&binance, &okx],
        no_liquidity(),
        &[],
        Duration::from_millis(50),
    );

    assert_eq!(h.scanner.run_cycle().await.alerts, 1);
    let second = h.scanner.run_cycle().await;
    assert_eq!(second.alerts, 0);
    assert_eq!(second.suppressed, 1);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(h.scanner.run_cycle().await.alerts, 1);
    assert_eq!(h.sink.messages().len(), 2);
}

#[tokio::test]
async fn changed_spread_is_a_new_signature() {
    let (binance, okx) = binance_okx();
    let h = harness(&[&binance, &okx], no_liquidity(), &[], WINDOW);

    assert_eq!(h.scanner.run_cycle().await.alerts, 1);
    okx.set_quote("BTC/USDT", dec!(100.7), dec!(100.8));
    assert_eq!(h.scanner.run_cycle().await.alerts, 1);
}

#[tokio::test]
async fn notification_failure_does_not_abort_cycle() {
    let (binance, okx) = binance_okx();
    let h = harness(&[&binance, &okx], no_liquidity(), &[], WINDOW);
    h.sink.set_fail(true);

    let report = h.scanner.run_cycle().await;

    assert_eq!(report.alerts, 1);
    assert!(h.scanner.status().is_ready());
}
