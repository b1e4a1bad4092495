//! Chat commands changing what the next cycle does.

use std::time::Duration;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use spread_watch::exchange::{ExchangeId, MockExchange};
use spread_watch::scanner::LoopState;

use crate::{harness, no_liquidity};

const WINDOW: Duration = Duration::from_secs(300);

#[tokio::test]
async fn setthreshold_applies_to_next_cycle() {
    let binance = MockExchange::new("binance").quote("BTC/USDT", dec!(99.9), dec!(100));
    let okx = MockExchange::new("okx").quote("BTC/USDT", dec!(100.5), dec!(100.6));
    let h = harness(&[&binance, &okx], no_liquidity(), &[], WINDOW);

    let replies = h.control.handle("/setthreshold 1").await;
    assert_eq!(replies, vec!["✅ New spread threshold: 100.000000%"]);
    let replies = h.control.handle("/setthreshold 0.6").await;
    assert_eq!(replies, vec!["✅ New spread threshold: 60.000000%"]);
    let replies = h.control.handle("/setthreshold 6").await;
    assert_eq!(replies, vec!["✅ New spread threshold: 6.000000%"]);
    assert_eq!(h.settings.threshold(), dec!(0.06));

    let report = h.scanner.run_cycle().await;
    assert_eq!(report.alerts, 0);
    assert_eq!(report.below_threshold, 2);

    h.control.handle("/setthreshold 0.003").await;
    let report = h.scanner.run_cycle().await;
    assert_eq!(report.alerts, 1);
}

#[tokio::test]
async fn setfee_changes_effective_buy() {
    let okx = MockExchange::new("okx").quote("BTC/USDT", dec!(99.9), dec!(100));
    let binance = MockExchange::new("binance").quote("BTC/USDT", dec!(100.5), dec!(100.6));
    let h = harness(
        &[&okx, &binance],
        no_liquidity(),
        &[("binance", dec!(0.1)), ("okx", dec!(0.1))],
        WINDOW,
    );

    let replies = h.control.handle("/setfee okx 0.2").await;
    assert_eq!(replies, vec!["✅ Fee for okx set to 0.2%"]);
    assert_eq!(h.settings.fee(&ExchangeId::new("okx")), dec!(0.2));

    let report = h.scanner.run_cycle().await;
    assert_eq!(report.alerts, 1);
    let text = &h.sink.texts()[0];
    assert!(text.contains("*Buy:* okx at 100 (fee 0.2%)"));
    // (100.3995 - 100.2) / 100.2
    assert!(text.contains("`0.20%`"));
}

#[tokio::test]
async fn setfee_by_legacy_name_reaches_canonical_venue() {
    let htx = MockExchange::new("htx").quote("BTC/USDT", dec!(99.9), dec!(100));
    let okx = MockExchange::new("okx").quote("BTC/USDT", dec!(100.5), dec!(100.6));
    let h = harness(&[&htx, &okx], no_liquidity(), &[], WINDOW);

    let replies = h.control.handle("/setfee huobipro 0.2").await;
    assert_eq!(replies, vec!["✅ Fee for htx set to 0.2%"]);
    assert_eq!(h.control.handle("/fees").await, vec!["Fees:\nhtx: 0.2%"]);

    let report = h.scanner.run_cycle().await;
    assert_eq!(report.alerts, 1);
    assert!(h.sink.texts()[0].contains("*Buy:* htx at 100 (fee 0.2%)"));
}

#[tokio::test]
async fn setfee_typo_changes_nothing() {
    let binance = MockExchange::new("binance");
    let h = harness(&[&binance], no_liquidity(), &[], WINDOW);

    let replies = h.control.handle("/setfee binace 0.2").await;
    assert_eq!(replies, vec!["❌ Unknown exchange binace. Monitored: binance"]);
    assert!(h.settings.fees().is_empty());
}

#[tokio::test]
async fn setinterval_below_minimum_is_rejected() {
    let binance = MockExchange::new("binance");
    let h = harness(&[&binance], no_liquidity(), &[], WINDOW);

    let replies = h.control.handle("/setinterval 3").await;
    assert_eq!(replies, vec!["❌ Interval too small; choose >=5s"]);
    assert_eq!(h.settings.poll_interval(), Duration::from_secs(30));

    let replies = h.control.handle("/setinterval 5").await;
    assert_eq!(replies, vec!["✅ Poll interval set to 5s"]);
    assert_eq!(h.settings.poll_interval(), Duration::from_secs(5));
}

#[tokio::test]
async fn malformed_commands_change_nothing() {
    let binance = MockExchange::new("binance");
    let h = harness(&[&binance], no_liquidity(), &[], WINDOW);

    let replies = h.control.handle("/setthreshold lots").await;
    assert!(replies[0].starts_with("❌ Usage: /setthreshold"));
    let replies = h.control.handle("/setfee binance").await;
    assert!(replies[0].starts_with("❌ Usage: /setfee"));

    assert_eq!(h.settings.threshold(), dec!(0.001));
    assert!(h.settings.fees().is_empty());
}

#[tokio::test]
async fn stop_and_resume_from_chat() {
    let binance = MockExchange::new("binance");
    let h = harness(&[&binance], no_liquidity(), &[], WINDOW);

    h.control.handle("/stop@spread_bot").await;
    assert_eq!(h.control.scan().state(), LoopState::Stopped);

    let status = h.control.handle("/status").await;
    assert_eq!(status[0], "❌ Bot stopped");
    assert_eq!(
        status[1],
        "Monitoring 1 exchanges, 1 pairs. Poll every 30s. Threshold 0.1%."
    );

    h.control.handle("/resume").await;
    assert_eq!(h.control.scan().state(), LoopState::Running);
}
