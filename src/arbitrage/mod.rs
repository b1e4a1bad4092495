//! Arbitrage module for spread detection.
//!
//! This module handles:
//! - Fee-adjusted spread calculation
//! - Classification of every cross-exchange comparison
//! - Alert deduplication through the cooldown ledger

pub mod calculator;
pub mod cooldown;
pub mod evaluator;

pub use calculator::{net_spread, ArbitrageOpportunity, NetSpread};
pub use cooldown::{CooldownKey, CooldownLedger};
pub use evaluator::{
    Classification, CycleReport, Evaluation, EvaluatorConfig, LiquidityPolicy, SpreadEvaluator,
};
