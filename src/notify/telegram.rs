//! Telegram Bot API delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use super::{AlertSink, OutboundMessage};
use crate::error::NotifyError;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    disable_web_page_preview: bool,
}

/// Sends messages with `sendMessage`.
#[derive(Debug, Clone)]
pub struct TelegramSink {
    http: reqwest::Client,
    api_base: String,
    token: String,
    default_chat_id: String,
}

impl TelegramSink {
    /// Create a sink with its own client bounded by `timeout`.
    pub fn new(
        token: &str,
        default_chat_id: &str,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
            token: token.trim().to_string(),
            default_chat_id: default_chat_id.trim().to_string(),
        })
    }

    /// Point the sink at another Bot API host.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    #[instrument(skip_all, fields(chat_id = tracing::field::Empty))]
    async fn send(&self, message: OutboundMessage) -> Result<(), NotifyError> {
        let chat_id = message.chat_id.as_deref().unwrap_or(&self.default_chat_id);
        tracing::Span::current().record("chat_id", chat_id);
        if self.token.is_empty() || chat_id.is_empty() {
            return Err(NotifyError::NotConfigured);
        }

        let body = SendMessage {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.map(|p| p.as_str()),
            disable_web_page_preview: true,
        };

        // The request URL carries the bot token.
        let response = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
