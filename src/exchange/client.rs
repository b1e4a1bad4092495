//! Shared HTTP plumbing for the public REST adapters.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ExchangeError;
use crate::orderbook::PriceLevel;

/// User agent sent to every venue. Some public endpoints reject the default.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) spread-watch/0.1";

/// Build the HTTP client shared by all adapters.
///
/// `timeout` bounds every request end to end.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(3)))
        .tcp_nodelay(true)
        .tcp_keepalive(Duration::from_secs(30))
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
}

/// GET `url` and return the body text, mapping transport and status errors.
pub async fn get_text(
    http: &reqwest::Client,
    exchange: &str,
    url: &str,
) -> Result<String, ExchangeError> {
    debug!(exchange, url, "GET");

    let response = http.get(url).send().await.map_err(|source| ExchangeError::Http {
        exchange: exchange.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExchangeError::Status {
            exchange: exchange.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| ExchangeError::Http {
        exchange: exchange.to_string(),
        source,
    })
}

/// Deserialize a venue payload, tagging failures with the venue name.
pub fn decode<T: DeserializeOwned>(exchange: &str, body: &str) -> Result<T, ExchangeError> {
    serde_json::from_str(body).map_err(|e| ExchangeError::parse(exchange, e.to_string()))
}

/// A numeric field that venues encode either as a JSON string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Num {
    /// `"123.45"`
    Text(String),
    /// `123.45`
    Number(serde_json::Number),
}

impl Num {
    /// Exact decimal value, if the field holds one.
    pub fn decimal(&self) -> Option<Decimal> {
        match self {
            Num::Text(s) => parse_decimal(s),
            Num::Number(n) => parse_decimal(&n.to_string()),
        }
    }
}

/// Parse plain or scientific notation (`1.5e-7`).
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

/// Decimal value of an optional field.
pub fn opt_decimal(value: &Option<Num>) -> Option<Decimal> {
    value.as_ref().and_then(Num::decimal)
}

/// Convert `[[price, size, ...], ...]` rows into levels, skipping bad rows.
pub fn parse_levels(rows: &[Vec<Num>]) -> Vec<PriceLevel> {
    rows.iter()
        .filter_map(|row| {
            let price = row.first()?.decimal()?;
            let size = row.get(1)?.decimal()?;
            Some(PriceLevel::new(price, size))
        })
        .collect()
}
