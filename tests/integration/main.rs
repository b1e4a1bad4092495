//! End-to-end tests over mock exchanges and an in-memory sink.
//!
//! Run with: cargo test --test integration

mod control;
mod pipeline;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use spread_watch::arbitrage::{CooldownLedger, EvaluatorConfig, SpreadEvaluator};
use spread_watch::control::{spawn_settings_task, ControlSurface, RuntimeSettings};
use spread_watch::exchange::{AdapterRegistry, ExchangeId, MockExchange, TradingPair};
use spread_watch::notify::{MemorySink, Notifier};
use spread_watch::scanner::{ScanLoopHandle, Scanner};

/// A scanner wired to mocks, plus the handles tests poke at.
pub struct Harness {
    pub scanner: Arc<Scanner>,
    pub sink: MemorySink,
    pub settings: Arc<RuntimeSettings>,
    pub control: ControlSurface,
}

pub fn btc() -> TradingPair {
    TradingPair::parse("BTC/USDT").unwrap()
}

/// Evaluator config with the depth check off.
pub fn no_liquidity() -> EvaluatorConfig {
    EvaluatorConfig {
        liquidity_check: false,
        ..EvaluatorConfig::default()
    }
}

pub fn harness(
    exchanges: &[&MockExchange],
    config: EvaluatorConfig,
    fees: &[(&str, Decimal)],
    cooldown: Duration,
) -> Harness {
    let registry = exchanges.iter().fold(AdapterRegistry::new(), |r, ex| {
        r.with(Arc::new((*ex).clone()))
    });
    let settings = Arc::new(RuntimeSettings::new(
        Decimal::new(1, 3),
        30,
        fees.iter().map(|(ex, pct)| (ExchangeId::new(ex), *pct)),
    ));
    let (client, _task) = spawn_settings_task(Arc::clone(&settings));
    let sink = MemorySink::new();
    let scanner = Arc::new(Scanner::new(
        registry.clone(),
        vec![btc()],
        SpreadEvaluator::new(config, Arc::new(CooldownLedger::new(cooldown))),
        Arc::clone(&settings),
        Notifier::new(Arc::new(sink.clone()), 5),
        Duration::from_secs(5),
    ));
    let control = ControlSurface::new(client, ScanLoopHandle::new(), vec![btc()], registry.ids());

    Harness {
        scanner,
        sink,
        settings,
        control,
    }
}
