//! Outbound notifications.
//!
//! This module handles:
//! - The [`AlertSink`] trait and its Telegram, log and in-memory backends
//! - Message formatting for opportunities and relayed alerts
//! - The best-effort [`Notifier`] wrapper used by the rest of the crate

pub mod format;
pub mod sinks;
pub mod telegram;

pub use format::{format_opportunity, format_relay_alert, RelayAlert};
pub use sinks::{LogSink, MemorySink};
pub use telegram::TelegramSink;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::arbitrage::ArbitrageOpportunity;
use crate::error::NotifyError;
use crate::metrics;

/// Formatting mode understood by the chat API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Telegram legacy Markdown.
    Markdown,
}

impl ParseMode {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Message body.
    pub text: String,
    /// Target chat; the sink's default chat when `None`.
    pub chat_id: Option<String>,
    /// Optional formatting mode.
    pub parse_mode: Option<ParseMode>,
}

impl OutboundMessage {
    /// Plain text to the default chat.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chat_id: None,
            parse_mode: None,
        }
    }

    /// Send to a specific chat.
    pub fn to_chat(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Use Markdown formatting.
    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Markdown);
        self
    }
}

/// Delivery backend.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one message. Implementations do not retry.
    async fn send(&self, message: OutboundMessage) -> Result<(), NotifyError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Best-effort front end over an [`AlertSink`].
///
/// Failures are logged and counted, never returned.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn AlertSink>,
    orderbook_levels: usize,
}

impl Notifier {
    /// Wrap `sink`. `orderbook_levels` is quoted in liquidity lines.
    pub fn new(sink: Arc<dyn AlertSink>, orderbook_levels: usize) -> Self {
        Self {
            sink,
            orderbook_levels,
        }
    }

    /// Backend name.
    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Send an opportunity alert to the default chat.
    pub async fn deliver(&self, opportunity: &ArbitrageOpportunity) -> bool {
        let text = format_opportunity(opportunity, self.orderbook_levels);
        self.send(OutboundMessage::text(text).markdown()).await
    }

    /// Reply to a specific chat.
    pub async fn reply(&self, chat_id: &str, text: &str) -> bool {
        self.send(OutboundMessage::text(text).to_chat(chat_id)).await
    }

    /// Forward a third-party alert to the default chat.
    pub async fn relay(&self, alert: &RelayAlert) -> bool {
        self.send(OutboundMessage::text(format_relay_alert(alert)))
            .await
    }

    /// Send plain text to the default chat.
    pub async fn announce(&self, text: &str) -> bool {
        self.send(OutboundMessage::text(text)).await
    }

    async fn send(&self, message: OutboundMessage) -> bool {
        match self.sink.send(message).await {
            Ok(()) => {
                debug!(sink = self.sink.name(), "Notification delivered");
                true
            }
            Err(e) => {
                warn!(sink = self.sink.name(), error = %e, "Notification failed");
                metrics::inc_notify_failures();
                false
            }
        }
    }
}
