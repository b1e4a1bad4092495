//! External uptime pinger.
//!
//! Polls a public URL and announces DOWN and recovery transitions. Runs as
//! its own CLI mode so it can watch a separately deployed instance.

use std::time::Duration;

use strum::Display;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::notify::Notifier;

/// Per-request timeout for the probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Message sent when the target goes down.
pub const DOWN_MESSAGE: &str = "❌ Bot unavailable!";
/// Message sent when the target recovers.
pub const RECOVERED_MESSAGE: &str = "✅ Bot back online.";

/// Probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Health {
    /// Target answered 200.
    Up,
    /// Error, timeout or non-200.
    Down,
}

/// Remembers whether the target was down.
///
/// Starts as "up", so the first failed probe alerts and a healthy start
/// stays silent.
#[derive(Debug, Default)]
pub struct UptimeTracker {
    was_down: bool,
}

impl UptimeTracker {
    /// Fresh tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one probe result. Returns the message to send on a transition.
    pub fn observe(&mut self, health: Health) -> Option<&'static str> {
        match (health, self.was_down) {
            (Health::Up, true) => {
                self.was_down = false;
                Some(RECOVERED_MESSAGE)
            }
            (Health::Down, false) => {
                self.was_down = true;
                Some(DOWN_MESSAGE)
            }
            _ => None,
        }
    }
}

/// Polls `url` and notifies on transitions.
pub struct Pinger {
    http: reqwest::Client,
    url: String,
    interval: Duration,
    notifier: Notifier,
}

impl Pinger {
    /// Create a pinger with its own HTTP client.
    pub fn new(url: &str, interval: Duration, notifier: Notifier) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.to_string(),
            interval,
            notifier,
        })
    }

    /// One GET against the target.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn probe(&self) -> Health {
        match self.http.get(&self.url).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => Health::Up,
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "Unexpected status");
                Health::Down
            }
            Err(e) => {
                warn!(error = %e, "Probe failed");
                Health::Down
            }
        }
    }

    /// Probe forever.
    pub async fn run(self) {
        let mut tracker = UptimeTracker::new();
        info!(url = %self.url, interval_secs = self.interval.as_secs(), "Pinger started");

        loop {
            let health = self.probe().await;
            let now = OffsetDateTime::now_utc();
            info!(url = %self.url, health = %health, at = %now, "Probe");

            if let Some(message) = tracker.observe(health) {
                self.notifier.announce(message).await;
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
