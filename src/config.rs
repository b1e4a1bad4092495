//! Application configuration loaded from environment variables.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::arbitrage::{EvaluatorConfig, LiquidityPolicy};
use crate::control::settings::MIN_POLL_INTERVAL_SECS;
use crate::exchange::{resolve_exchange, ExchangeId, TradingPair};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Telegram ===
    /// Bot API token used for alerts and command replies.
    #[serde(default)]
    pub telegram_bot_token: Option<String>,

    /// Default chat that receives opportunity alerts.
    #[serde(default)]
    pub telegram_chat_id: Option<String>,

    /// Timeout for outbound chat messages.
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,

    // === Scanning ===
    /// Venue ids to monitor (comma separated).
    #[serde(default = "default_exchanges")]
    pub exchanges: Vec<String>,

    /// Pairs to monitor, e.g. `BTC/USDT` (comma separated).
    #[serde(default = "default_trading_pairs")]
    pub trading_pairs: Vec<String>,

    /// Seconds between full scans.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout applied to every exchange HTTP request.
    #[serde(default = "default_exchange_timeout")]
    pub exchange_timeout_secs: u64,

    /// Upper bound on one exchange's whole contribution to a cycle.
    #[serde(default = "default_exchange_deadline")]
    pub exchange_deadline_secs: u64,

    /// Concurrent pair requests per exchange.
    #[serde(default = "default_pair_concurrency")]
    pub pair_concurrency: usize,

    // === Detection ===
    /// Minimum net relative spread to alert (0.001 == 0.1%).
    #[serde(default = "default_spread_threshold")]
    pub spread_threshold: Decimal,

    /// Spreads above this are treated as stale or fake data.
    #[serde(default = "default_max_spread")]
    pub max_spread: Decimal,

    /// Enable the `max_spread` sanity bound.
    #[serde(default = "default_true")]
    pub sanity_check_enabled: bool,

    /// Initial fee overrides as `exchange:percent` entries.
    #[serde(default)]
    pub fees: Vec<String>,

    /// Seconds to suppress a repeated alert.
    #[serde(default = "default_alert_cooldown")]
    pub alert_cooldown_secs: u64,

    // === Liquidity ===
    /// Check order book depth before alerting.
    #[serde(default = "default_true")]
    pub liquidity_check_enabled: bool,

    /// Minimum USD notional on both sides.
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity_usd: Decimal,

    /// Book levels summed for the depth check.
    #[serde(default = "default_orderbook_levels")]
    pub orderbook_levels: usize,

    /// What to do when depth data is unavailable.
    #[serde(default)]
    pub liquidity_policy: LiquidityPolicy,

    // === Server Configuration ===
    /// HTTP server port for health, webhook and relay endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret for the third-party alert relay.
    #[serde(default)]
    pub relay_token: Option<String>,

    // === Uptime pinger ===
    /// Public URL of the running bot, polled by `ping`.
    #[serde(default)]
    pub ping_url: Option<String>,

    /// Seconds between pings.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
}

fn default_notify_timeout() -> u64 {
    8
}

fn default_exchanges() -> Vec<String> {
    [
        "binance", "huobipro", "bybit", "okx", "kucoin", "gateio", "mexc", "bitget",
        "coinbasepro", "kraken", "bitstamp", "bitfinex",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_trading_pairs() -> Vec<String> {
    [
        "BTC/USDT", "ETH/USDT", "BNB/USDT", "SOL/USDT", "XRP/USDT", "DOGE/USDT", "TON/USDT",
        "TRX/USDT", "ADA/USDT", "MATIC/USDT", "AVAX/USDT", "DOT/USDT", "SHIB/USDT", "LTC/USDT",
        "BCH/USDT", "UNI/USDT", "LINK/USDT", "ATOM/USDT", "XLM/USDT", "NEAR/USDT", "APT/USDT",
        "OP/USDT", "ARB/USDT", "FIL/USDT", "ETC/USDT", "ICP/USDT", "HBAR/USDT", "SAND/USDT",
        "AXS/USDT", "FLOW/USDT", "CHZ/USDT", "EOS/USDT", "RUNE/USDT", "ALGO/USDT", "MANA/USDT",
        "DYDX/USDT", "GRT/USDT", "CRV/USDT", "1INCH/USDT", "MKR/USDT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_exchange_timeout() -> u64 {
    5
}

fn default_exchange_deadline() -> u64 {
    25
}

fn default_pair_concurrency() -> usize {
    8
}

fn default_spread_threshold() -> Decimal {
    Decimal::new(1, 3) // 0.001
}

fn default_max_spread() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

fn default_true() -> bool {
    true
}

fn default_alert_cooldown() -> u64 {
    300
}

fn default_min_liquidity() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_orderbook_levels() -> usize {
    5
}

fn default_port() -> u16 {
    10000
}

fn default_ping_interval() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_id: None,
            notify_timeout_secs: default_notify_timeout(),
            exchanges: default_exchanges(),
            trading_pairs: default_trading_pairs(),
            poll_interval_secs: default_poll_interval(),
            exchange_timeout_secs: default_exchange_timeout(),
            exchange_deadline_secs: default_exchange_deadline(),
            pair_concurrency: default_pair_concurrency(),
            spread_threshold: default_spread_threshold(),
            max_spread: default_max_spread(),
            sanity_check_enabled: true,
            fees: Vec::new(),
            alert_cooldown_secs: default_alert_cooldown(),
            liquidity_check_enabled: true,
            min_liquidity_usd: default_min_liquidity(),
            orderbook_levels: default_orderbook_levels(),
            liquidity_policy: LiquidityPolicy::default(),
            port: default_port(),
            relay_token: None,
            ping_url: None,
            ping_interval_secs: default_ping_interval(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.exchanges.iter().all(|e| e.trim().is_empty()) {
            return Err("EXCHANGES must list at least one exchange".to_string());
        }

        let pairs = self.tracked_pairs()?;
        if pairs.is_empty() {
            return Err("TRADING_PAIRS must list at least one pair".to_string());
        }

        if self.poll_interval_secs < MIN_POLL_INTERVAL_SECS {
            return Err(format!(
                "POLL_INTERVAL_SECS must be at least {}",
                MIN_POLL_INTERVAL_SECS
            ));
        }

        if self.exchange_timeout_secs == 0 || self.exchange_deadline_secs == 0 {
            return Err("exchange timeouts must be greater than zero".to_string());
        }

        if self.pair_concurrency == 0 {
            return Err("PAIR_CONCURRENCY must be at least 1".to_string());
        }

        if self.spread_threshold.is_sign_negative() {
            return Err("SPREAD_THRESHOLD must not be negative".to_string());
        }

        if self.max_spread <= Decimal::ZERO {
            return Err("MAX_SPREAD must be positive".to_string());
        }

        if self.orderbook_levels == 0 {
            return Err("ORDERBOOK_LEVELS must be at least 1".to_string());
        }

        self.fee_overrides()?;

        if let Some(url) = &self.ping_url {
            url::Url::parse(url).map_err(|e| format!("PING_URL is not a valid URL: {}", e))?;
        }

        Ok(())
    }

    /// Parse `TRADING_PAIRS` into validated pairs.
    pub fn tracked_pairs(&self) -> Result<Vec<TradingPair>, String> {
        self.trading_pairs
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| TradingPair::parse(s).ok_or_else(|| format!("invalid trading pair `{}`", s)))
            .collect()
    }

    /// Parse `FEES` entries of the form `exchange:percent`.
    pub fn fee_overrides(&self) -> Result<Vec<(ExchangeId, Decimal)>, String> {
        let mut out = Vec::new();
        for entry in self.fees.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let (exchange, pct) = entry
                .split_once(':')
                .ok_or_else(|| format!("fee entry `{}` must look like exchange:percent", entry))?;
            let pct: Decimal = pct
                .trim()
                .parse()
                .map_err(|_| format!("fee entry `{}` has a non-numeric percent", entry))?;
            if pct.is_sign_negative() || pct >= Decimal::ONE_HUNDRED {
                return Err(format!("fee entry `{}` is out of range", entry));
            }
            let exchange = resolve_exchange(exchange)
                .ok_or_else(|| format!("fee entry `{}` names an unsupported exchange", entry))?;
            out.push((exchange, pct));
        }
        Ok(out)
    }

    /// Whether both Telegram credentials are present.
    pub fn telegram_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.telegram_bot_token) && present(&self.telegram_chat_id)
    }

    /// Static evaluator knobs derived from this config.
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            max_spread: self.sanity_check_enabled.then_some(self.max_spread),
            liquidity_check: self.liquidity_check_enabled,
            min_liquidity_usd: self.min_liquidity_usd,
            orderbook_levels: self.orderbook_levels,
            liquidity_policy: self.liquidity_policy,
        }
    }

    /// Per-request exchange timeout.
    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_secs)
    }

    /// Per-exchange cycle deadline.
    pub fn exchange_deadline(&self) -> Duration {
        Duration::from_secs(self.exchange_deadline_secs)
    }

    /// Cooldown window for repeated alerts.
    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_secs)
    }
}
