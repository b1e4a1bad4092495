//! Log-only and in-memory sinks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use super::{AlertSink, OutboundMessage};
use crate::error::NotifyError;

/// Writes messages to the log. Used when chat credentials are missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn send(&self, message: OutboundMessage) -> Result<(), NotifyError> {
        info!(
            chat_id = message.chat_id.as_deref().unwrap_or("default"),
            text = %message.text,
            "Notification (no chat credentials configured)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Records messages in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<OutboundMessage>>>,
    fail: Arc<AtomicBool>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far.
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().clone()
    }

    /// Text of everything sent so far.
    pub fn texts(&self) -> Vec<String> {
        self.messages.lock().iter().map(|m| m.text.clone()).collect()
    }

    /// Forget recorded messages.
    pub fn clear(&self) {
        self.messages.lock().clear();
    }

    /// Make subsequent sends fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AlertSink for MemorySink {
    async fn send(&self, message: OutboundMessage) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "memory sink set to fail".to_string(),
            });
        }
        self.messages.lock().push(message);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sink_always_succeeds() {
        assert!(LogSink.send(OutboundMessage::text("hi")).await.is_ok());
    }

    #[tokio::test]
    async fn memory_sink_records_and_clears() {
        let sink = MemorySink::new();
        sink.send(OutboundMessage::text("one")).await.unwrap();
        sink.send(OutboundMessage::text("two")).await.unwrap();
        assert_eq!(sink.texts(), vec!["one", "two"]);

        sink.clear();
        assert!(sink.messages().is_empty());
    }
}
