//! Cross-exchange comparison and classification.
//!
//! For every tracked pair and every ordered `(buy, sell)` exchange pair the
//! evaluator computes the fee-adjusted spread and classifies it, in order:
//! below threshold, implausible, liquidity-rejected, suppressed, alert.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use crate::control::settings::SettingsSnapshot;
use crate::exchange::{AdapterRegistry, BookSide, ExchangeId, TradingPair};
use crate::metrics;
use crate::orderbook::depth_usd;
use crate::scanner::PriceSnapshot;

use super::calculator::{net_spread, ArbitrageOpportunity};
use super::cooldown::{CooldownKey, CooldownLedger};

/// What to do when order book depth cannot be determined.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LiquidityPolicy {
    /// Unknown depth passes the check.
    #[default]
    FailOpen,
    /// Unknown depth rejects the opportunity.
    FailClosed,
}

/// Static evaluator knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Spreads above this are discarded as bad data. `None` disables the bound.
    pub max_spread: Option<Decimal>,
    /// Whether to check order book depth before alerting.
    pub liquidity_check: bool,
    /// Minimum USD notional required on each side.
    pub min_liquidity_usd: Decimal,
    /// Number of book levels summed.
    pub orderbook_levels: usize,
    /// Handling of failed or empty depth lookups.
    pub liquidity_policy: LiquidityPolicy,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_spread: Some(Decimal::new(10, 2)),
            liquidity_check: true,
            min_liquidity_usd: Decimal::new(1000, 0),
            orderbook_levels: 5,
            liquidity_policy: LiquidityPolicy::FailOpen,
        }
    }
}

/// Outcome of one counted comparison.
#[derive(Debug, Clone)]
pub enum Classification {
    /// Net spread under the threshold.
    BelowThreshold,
    /// Net spread above the sanity bound.
    Implausible,
    /// One side's book is too thin (or unknown under fail-closed).
    LiquidityRejected,
    /// Same signature alerted within the cooldown window.
    Suppressed,
    /// Alert-worthy.
    Alert(Box<ArbitrageOpportunity>),
}

/// Per-cycle counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// Adapters invoked.
    pub exchanges_queried: usize,
    /// Adapters that returned at least one quote.
    pub exchanges_responding: usize,
    /// Adapters that failed or timed out.
    pub failed_exchanges: Vec<ExchangeId>,
    /// Quotes in the snapshot.
    pub quotes: usize,
    /// Comparisons with both quotes present and valid.
    pub comparisons: usize,
    /// Comparisons under the threshold.
    pub below_threshold: usize,
    /// Comparisons over the sanity bound.
    pub implausible: usize,
    /// Comparisons rejected by the depth check.
    pub liquidity_rejected: usize,
    /// Comparisons suppressed by cooldown.
    pub suppressed: usize,
    /// Opportunities found.
    pub alerts: usize,
    /// Wall time of the whole cycle in milliseconds.
    pub elapsed_ms: u64,
    /// When the cycle finished.
    #[serde(with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
}

impl CycleReport {
    fn count(&mut self, classification: &Classification) {
        self.comparisons += 1;
        match classification {
            Classification::BelowThreshold => self.below_threshold += 1,
            Classification::Implausible => self.implausible += 1,
            Classification::LiquidityRejected => self.liquidity_rejected += 1,
            Classification::Suppressed => self.suppressed += 1,
            Classification::Alert(_) => self.alerts += 1,
        }
    }
}

/// Opportunities plus counters for one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Opportunities to deliver, in discovery order.
    pub opportunities: Vec<ArbitrageOpportunity>,
    /// Counters.
    pub report: CycleReport,
}

/// Book depth of both sides and whether it clears the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DepthCheck {
    buy_usd: Option<Decimal>,
    sell_usd: Option<Decimal>,
    passed: bool,
}

/// Compares every exchange pair in a snapshot.
pub struct SpreadEvaluator {
    config: EvaluatorConfig,
    ledger: Arc<CooldownLedger>,
}

impl SpreadEvaluator {
    /// Create an evaluator sharing `ledger` with the scan loop.
    pub fn new(config: EvaluatorConfig, ledger: Arc<CooldownLedger>) -> Self {
        Self { config, ledger }
    }

    /// The cooldown ledger in use.
    pub fn ledger(&self) -> &Arc<CooldownLedger> {
        &self.ledger
    }

    /// Evaluate all comparisons in `snapshot`.
    ///
    /// `registry` is only used for depth lookups.
    #[instrument(skip_all, fields(pairs = pairs.len(), exchanges = snapshot.responding()))]
    pub async fn evaluate(
        &self,
        snapshot: &PriceSnapshot,
        settings: &SettingsSnapshot,
        pairs: &[TradingPair],
        registry: &AdapterRegistry,
    ) -> Evaluation {
        let mut evaluation = Evaluation::default();
        let exchanges: Vec<&ExchangeId> = snapshot.exchanges().collect();

        for pair in pairs {
            for buy in &exchanges {
                for sell in &exchanges {
                    if buy == sell {
                        continue;
                    }
                    let Some(classification) = self
                        .classify(snapshot, settings, pair, buy, sell, registry)
                        .await
                    else {
                        continue;
                    };

                    evaluation.report.count(&classification);
                    if let Classification::Alert(opportunity) = classification {
                        evaluation.opportunities.push(*opportunity);
                    }
                }
            }
        }

        let report = &evaluation.report;
        metrics::add_comparisons(report.comparisons as u64);
        info!(
            comparisons = report.comparisons,
            opportunities = report.alerts,
            suppressed = report.suppressed,
            liquidity_rejected = report.liquidity_rejected,
            implausible = report.implausible,
            "Checked {} comparisons, found {} opportunities",
            report.comparisons,
            report.alerts
        );
        evaluation
    }

    /// Classify one ordered comparison. `None` means it was not counted.
    pub async fn classify(
        &self,
        snapshot: &PriceSnapshot,
        settings: &SettingsSnapshot,
        pair: &TradingPair,
        buy: &ExchangeId,
        sell: &ExchangeId,
        registry: &AdapterRegistry,
    ) -> Option<Classification> {
        let buy_quote = snapshot.quote(buy, pair)?;
        let sell_quote = snapshot.quote(sell, pair)?;

        let buy_fee = settings.fee(buy);
        let sell_fee = settings.fee(sell);
        let spread = net_spread(buy_quote.ask, buy_fee, sell_quote.bid, sell_fee)?.spread;

        if spread < settings.threshold {
            return Some(Classification::BelowThreshold);
        }

        if let Some(bound) = self.config.max_spread {
            if spread > bound {
                debug!(
                    pair = %pair,
                    buy = %buy,
                    sell = %sell,
                    spread = %spread,
                    "Implausible spread, skipping"
                );
                metrics::inc_implausible();
                return Some(Classification::Implausible);
            }
        }

        let depth = if self.config.liquidity_check {
            let check = self.check_depth(registry, pair, buy, sell).await;
            if !check.passed {
                info!(
                    pair = %pair,
                    buy = %buy,
                    sell = %sell,
                    buy_usd = ?check.buy_usd,
                    sell_usd = ?check.sell_usd,
                    min_usd = %self.config.min_liquidity_usd,
                    "liquidity-skip"
                );
                metrics::inc_liquidity_rejected();
                return Some(Classification::LiquidityRejected);
            }
            Some(check)
        } else {
            None
        };

        let key = CooldownKey::new(pair, buy, sell, spread);
        if !self.ledger.try_acquire(key, Instant::now()) {
            debug!(pair = %pair, buy = %buy, sell = %sell, "Cooldown active, suppressing");
            metrics::inc_suppressed();
            return Some(Classification::Suppressed);
        }

        metrics::inc_alerts();
        Some(Classification::Alert(Box::new(ArbitrageOpportunity {
            pair: pair.clone(),
            buy_exchange: buy.clone(),
            buy_price: buy_quote.ask,
            buy_fee,
            sell_exchange: sell.clone(),
            sell_price: sell_quote.bid,
            sell_fee,
            net_spread: spread,
            buy_liquidity_usd: depth.and_then(|d| d.buy_usd),
            sell_liquidity_usd: depth.and_then(|d| d.sell_usd),
            detected_at: OffsetDateTime::now_utc(),
        })))
    }

    /// Look up both sides concurrently and apply the policy.
    async fn check_depth(
        &self,
        registry: &AdapterRegistry,
        pair: &TradingPair,
        buy: &ExchangeId,
        sell: &ExchangeId,
    ) -> DepthCheck {
        let levels = self.config.orderbook_levels;
        let (buy_usd, sell_usd) = tokio::join!(
            self.side_depth(registry, buy, pair, BookSide::Asks, levels),
            self.side_depth(registry, sell, pair, BookSide::Bids, levels),
        );

        self.judge_depth(buy_usd, sell_usd)
    }

    /// Apply the minimum and the unknown-depth policy to both sides.
    fn judge_depth(&self, buy_usd: Option<Decimal>, sell_usd: Option<Decimal>) -> DepthCheck {
        let side_ok = |usd: Option<Decimal>| match usd {
            Some(v) => v >= self.config.min_liquidity_usd,
            None => self.config.liquidity_policy == LiquidityPolicy::FailOpen,
        };

        DepthCheck {
            buy_usd,
            sell_usd,
            passed: side_ok(buy_usd) && side_ok(sell_usd),
        }
    }

    /// USD depth of one side, `None` when unknown.
    async fn side_depth(
        &self,
        registry: &AdapterRegistry,
        exchange: &ExchangeId,
        pair: &TradingPair,
        side: BookSide,
        levels: usize,
    ) -> Option<Decimal> {
        let adapter = registry.get(exchange)?;
        match adapter.fetch_depth(pair, side, levels).await {
            Ok(book) => depth_usd(&book, levels),
            Err(e) => {
                debug!(exchange = %exchange, pair = %pair, side = %side, error = %e, "Depth lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{MockExchange, PriceQuote, QuoteMap};
    use crate::orderbook::PriceLevel;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::time::Duration;

    fn btc() -> TradingPair {
        TradingPair::parse("BTC/USDT").unwrap()
    }

    fn settings(threshold: Decimal, fees: &[(&str, Decimal)]) -> SettingsSnapshot {
        SettingsSnapshot {
            threshold,
            poll_interval_secs: 30,
            fees: fees
                .iter()
                .map(|(id, fee)| (ExchangeId::new(id), *fee))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn snapshot(entries: &[(&str, Decimal, Decimal)]) -> PriceSnapshot {
        PriceSnapshot::from_parts(
            entries.iter().map(|(id, bid, ask)| {
                (
                    ExchangeId::new(id),
                    QuoteMap::from([(btc(), PriceQuote::new(*bid, *ask).unwrap())]),
                )
            }),
            Vec::new(),
        )
    }

    fn evaluator(config: EvaluatorConfig) -> SpreadEvaluator {
        SpreadEvaluator::new(config, Arc::new(CooldownLedger::new(Duration::from_secs(300))))
    }

    fn no_liquidity() -> EvaluatorConfig {
        EvaluatorConfig {
            liquidity_check: false,
            ..EvaluatorConfig::default()
        }
    }

    #[tokio::test]
    async fn finds_reference_opportunity() {
        let snap = snapshot(&[
            ("binance", dec!(99.9), dec!(100)),
            ("okx", dec!(100.5), dec!(100.6)),
        ]);
        let settings = settings(dec!(0.001), &[("binance", dec!(0.1)), ("okx", dec!(0.1))]);

        let eval = evaluator(no_liquidity())
            .evaluate(&snap, &settings, &[btc()], &AdapterRegistry::new())
            .await;

        assert_eq!(eval.report.comparisons, 2);
        assert_eq!(eval.report.alerts, 1);
        let opp = &eval.opportunities[0];
        assert_eq!(opp.buy_exchange, ExchangeId::new("binance"));
        assert_eq!(opp.sell_exchange, ExchangeId::new("okx"));
        assert_eq!(opp.buy_price, dec!(100));
        assert_eq!(opp.sell_price, dec!(100.5));
        assert_eq!(opp.buy_liquidity_usd, None);
        assert_eq!(opp.net_profit_pct().round_dp(2), dec!(0.30));
    }

    #[tokio::test]
    async fn missing_quotes_are_not_counted() {
        let snap = snapshot(&[("binance", dec!(100), dec!(100.1))]);
        let eval = evaluator(no_liquidity())
            .evaluate(&snap, &settings(dec!(0.001), &[]), &[btc()], &AdapterRegistry::new())
            .await;
        assert_eq!(eval.report.comparisons, 0);
    }

    #[tokio::test]
    async fn spread_equal_to_threshold_alerts() {
        let snap = snapshot(&[("a", dec!(99), dec!(100)), ("b", dec!(101), dec!(102))]);
        let eval = evaluator(no_liquidity())
            .evaluate(&snap, &settings(dec!(0.01), &[]), &[btc()], &AdapterRegistry::new())
            .await;
        assert_eq!(eval.report.alerts, 1);
        assert_eq!(eval.report.below_threshold, 1);
    }

    #[tokio::test]
    async fn implausible_spread_is_discarded() {
        let snap = snapshot(&[("a", dec!(99), dec!(100)), ("b", dec!(120), dec!(121))]);
        let eval = evaluator(no_liquidity())
            .evaluate(&snap, &settings(dec!(0.001), &[]), &[btc()], &AdapterRegistry::new())
            .await;
        assert_eq!(eval.report.implausible, 1);
        assert!(eval.opportunities.is_empty());

        let unbounded = EvaluatorConfig {
            max_spread: None,
            ..no_liquidity()
        };
        let eval = evaluator(unbounded)
            .evaluate(&snap, &settings(dec!(0.001), &[]), &[btc()], &AdapterRegistry::new())
            .await;
        assert_eq!(eval.report.alerts, 1);
    }

    #[tokio::test]
    async fn thin_book_is_rejected() {
        let buy = MockExchange::new("a").depth(
            "BTC/USDT",
            BookSide::Asks,
            vec![PriceLevel::new(dec!(100), dec!(5))],
        );
        let sell = MockExchange::new("b").depth(
            "BTC/USDT",
            BookSide::Bids,
            vec![PriceLevel::new(dec!(101), dec!(100))],
        );
        let registry = AdapterRegistry::new()
            .with(Arc::new(buy.clone()))
            .with(Arc::new(sell.clone()));
        let snap = snapshot(&[("a", dec!(99), dec!(100)), ("b", dec!(101), dec!(102))]);

        let eval = evaluator(EvaluatorConfig::default())
            .evaluate(&snap, &settings(dec!(0.001), &[]), &[btc()], &registry)
            .await;

        assert_eq!(eval.report.liquidity_rejected, 1);
        assert!(eval.opportunities.is_empty());
        assert_eq!(buy.depth_calls(), 1);
        assert_eq!(sell.depth_calls(), 1);
    }

    #[test]
    fn depth_below_minimum_fails_and_keeps_values() {
        let eval = evaluator(EvaluatorConfig::default());
        assert_eq!(eval.config.min_liquidity_usd, dec!(1000));

        assert_eq!(
            eval.judge_depth(Some(dec!(500)), Some(dec!(5000))),
            DepthCheck {
                buy_usd: Some(dec!(500)),
                sell_usd: Some(dec!(5000)),
                passed: false,
            }
        );
        assert!(!eval.judge_depth(Some(dec!(5000)), Some(dec!(999.99))).passed);
        assert!(eval.judge_depth(Some(dec!(1000)), Some(dec!(1000))).passed);
        assert!(eval.judge_depth(None, Some(dec!(1000))).passed);

        let closed = evaluator(EvaluatorConfig {
            liquidity_policy: LiquidityPolicy::FailClosed,
            ..EvaluatorConfig::default()
        });
        assert!(!closed.judge_depth(None, Some(dec!(1000))).passed);
    }

    #[tokio::test]
    async fn thin_buy_side_classifies_as_liquidity_rejected() {
        let buy = MockExchange::new("a").depth(
            "BTC/USDT",
            BookSide::Asks,
            vec![PriceLevel::new(dec!(100), dec!(5))],
        );
        let sell = MockExchange::new("b").depth(
            "BTC/USDT",
            BookSide::Bids,
            vec![PriceLevel::new(dec!(101), dec!(100))],
        );
        let registry = AdapterRegistry::new()
            .with(Arc::new(buy))
            .with(Arc::new(sell));
        let snap = snapshot(&[("a", dec!(99), dec!(100)), ("b", dec!(101), dec!(102))]);

        let class = evaluator(EvaluatorConfig::default())
            .classify(
                &snap,
                &settings(dec!(0.001), &[]),
                &btc(),
                &ExchangeId::new("a"),
                &ExchangeId::new("b"),
                &registry,
            )
            .await;

        assert!(matches!(class, Some(Classification::LiquidityRejected)));
    }

    #[tokio::test]
    async fn deep_book_passes_and_reports_depth() {
        let buy = MockExchange::new("a").depth(
            "BTC/USDT",
            BookSide::Asks,
            vec![PriceLevel::new(dec!(100), dec!(20))],
        );
        let sell = MockExchange::new("b").depth(
            "BTC/USDT",
            BookSide::Bids,
            vec![PriceLevel::new(dec!(101), dec!(30))],
        );
        let registry = AdapterRegistry::new()
            .with(Arc::new(buy))
            .with(Arc::new(sell));
        let snap = snapshot(&[("a", dec!(99), dec!(100)), ("b", dec!(101), dec!(102))]);

        let eval = evaluator(EvaluatorConfig::default())
            .evaluate(&snap, &settings(dec!(0.001), &[]), &[btc()], &registry)
            .await;

        let opp = &eval.opportunities[0];
        assert_eq!(opp.buy_liquidity_usd, Some(dec!(2000)));
        assert_eq!(opp.sell_liquidity_usd, Some(dec!(3030)));
    }

    #[tokio::test]
    async fn unknown_depth_follows_policy() {
        let buy = MockExchange::new("a");
        buy.set_fail_depth(true);
        let sell = MockExchange::new("b");
        let registry = AdapterRegistry::new()
            .with(Arc::new(buy))
            .with(Arc::new(sell));
        let snap = snapshot(&[("a", dec!(99), dec!(100)), ("b", dec!(101), dec!(102))]);
        let s = settings(dec!(0.001), &[]);

        let open = evaluator(EvaluatorConfig::default())
            .evaluate(&snap, &s, &[btc()], &registry)
            .await;
        assert_eq!(open.report.alerts, 1);

        let closed = EvaluatorConfig {
            liquidity_policy: LiquidityPolicy::FailClosed,
            ..EvaluatorConfig::default()
        };
        let closed = evaluator(closed)
            .evaluate(&snap, &s, &[btc()], &registry)
            .await;
        assert_eq!(closed.report.liquidity_rejected, 1);
    }

    #[tokio::test]
    async fn repeat_within_window_is_suppressed() {
        let snap = snapshot(&[("a", dec!(99), dec!(100)), ("b", dec!(101), dec!(102))]);
        let s = settings(dec!(0.001), &[]);
        let ev = evaluator(no_liquidity());
        let registry = AdapterRegistry::new();

        let first = ev.evaluate(&snap, &s, &[btc()], &registry).await;
        let second = ev.evaluate(&snap, &s, &[btc()], &registry).await;

        assert_eq!(first.report.alerts, 1);
        assert_eq!(second.report.alerts, 0);
        assert_eq!(second.report.suppressed, 1);
    }

    #[test]
    fn policy_parses_from_snake_case() {
        use std::str::FromStr;
        assert_eq!(
            LiquidityPolicy::from_str("fail_closed").unwrap(),
            LiquidityPolicy::FailClosed
        );
        assert_eq!(LiquidityPolicy::default().to_string(), "fail_open");
    }
}
