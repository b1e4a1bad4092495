//! Unified error types for the spread monitor.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the spread monitor.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration was loaded but is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Exchange adapter error.
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// Runtime settings error.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Notification delivery error.
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while talking to an exchange's public API.
///
/// These never escape an adapter's `fetch_quotes`; they are logged at the
/// adapter boundary and the affected pair is simply missing from the result.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Transport failure (timeout, connection refused, TLS).
    #[error("{exchange}: http request failed: {source}")]
    Http {
        /// Exchange that failed.
        exchange: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response.
    #[error("{exchange}: unexpected HTTP status {status}")]
    Status {
        /// Exchange that failed.
        exchange: String,
        /// HTTP status code.
        status: u16,
    },

    /// The venue answered with an API-level error payload.
    #[error("{exchange}: api error: {message}")]
    Api {
        /// Exchange that failed.
        exchange: String,
        /// Error message reported by the venue.
        message: String,
    },

    /// Response body had an unexpected shape.
    #[error("{exchange}: failed to parse response: {reason}")]
    Parse {
        /// Exchange that failed.
        exchange: String,
        /// What was wrong with the payload.
        reason: String,
    },

    /// The venue has no usable quote for the pair.
    #[error("{exchange}: no quote for {pair}")]
    NoQuote {
        /// Exchange queried.
        exchange: String,
        /// Pair requested.
        pair: String,
    },
}

impl ExchangeError {
    /// Build a parse error for the given venue.
    pub fn parse(exchange: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            exchange: exchange.to_string(),
            reason: reason.into(),
        }
    }

    /// Build an API error for the given venue.
    pub fn api(exchange: &str, message: impl Into<String>) -> Self {
        Self::Api {
            exchange: exchange.to_string(),
            message: message.into(),
        }
    }
}

/// Rejected runtime settings updates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Poll interval below the allowed minimum.
    #[error("interval {requested}s is below the minimum of {minimum}s")]
    IntervalTooSmall {
        /// Requested interval in seconds.
        requested: u64,
        /// Minimum allowed interval in seconds.
        minimum: u64,
    },

    /// Threshold cannot be negative.
    #[error("threshold must not be negative, got {0}")]
    NegativeThreshold(Decimal),

    /// Fee percentage out of range.
    #[error("fee must be within [0, 100) percent, got {0}")]
    FeeOutOfRange(Decimal),

    /// The settings task is no longer running.
    #[error("settings channel closed")]
    ChannelClosed,
}

/// Malformed control commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Text does not start with `/`.
    #[error("message is not a command")]
    NotACommand,

    /// Command name is not recognized.
    #[error("unknown command `{0}`")]
    Unknown(String),

    /// Arguments missing or malformed; carries the usage hint.
    #[error("{0}")]
    Usage(&'static str),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No bot token or chat id configured.
    #[error("notification channel not configured")]
    NotConfigured,

    /// Transport failure.
    #[error("delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat API rejected the message.
    #[error("delivery rejected: HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
