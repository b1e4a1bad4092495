//! Cross-exchange crypto spread monitor.
//!
//! Polls best bid/ask for a set of pairs on many exchanges, computes every
//! pairwise spread net of fees, and sends a chat alert when one clears the
//! threshold:
//!
//! ```text
//! buy  on binance: ask 100.00, fee 0.1%  → effective 100.1000
//! sell on okx:     bid 100.50, fee 0.1%  → effective 100.3995
//! ─────────────────────────────────────────────────────────────
//! spread = (100.3995 - 100.1000) / 100.1000 ≈ 0.299%  ≥ 0.1% ✅
//! ```
//!
//! Alerts are gated by a sanity bound, an optional order book depth check and
//! a per-signature cooldown.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`exchange`]: Exchange adapters, registry and quote types
//! - [`orderbook`]: Depth levels and liquidity sums
//! - [`arbitrage`]: Spread math, classification and cooldowns
//! - [`scanner`]: Per-cycle snapshots and the scan loop
//! - [`control`]: Chat commands and runtime settings
//! - [`notify`]: Alert sinks and message formatting
//! - [`api`]: HTTP API for health, status, metrics, webhook and relay
//! - [`uptime`]: External uptime pinger
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod arbitrage;
pub mod config;
pub mod control;
pub mod error;
pub mod exchange;
pub mod metrics;
pub mod notify;
pub mod orderbook;
pub mod scanner;
pub mod uptime;
pub mod utils;

pub use config::Config;
pub use error::{BotError, Result};
