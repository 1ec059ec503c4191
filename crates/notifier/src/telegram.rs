//! Telegram Bot API notifier.
//!
//! Delivers alerts via `POST {api}/bot{token}/sendMessage` with legacy
//! Markdown formatting. The bot token is part of the URL, so it is stripped
//! from transport errors and never logged.

use serde::Deserialize;

use sentinel_common::config::AppConfig;
use sentinel_common::error::NotifyError;
use sentinel_common::types::Channel;
use sentinel_engine::Notifier;

use crate::message::format_alert;

/// Subset of the Bot API response envelope.
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts to one Telegram chat.
pub struct TelegramNotifier {
    api_base: String,
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &AppConfig) -> Self {
        Self::new(
            client,
            config.telegram_api_url.clone(),
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
        )
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, channel: &Channel) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": format_alert(channel),
            "parse_mode": "Markdown",
        });

        tracing::debug!(chat_id = %self.chat_id, "Sending Telegram notification");

        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        let parsed = serde_json::from_str::<TelegramResponse>(&text).ok();
        if status.is_success() && parsed.as_ref().is_some_and(|r| r.ok) {
            tracing::info!(chat_id = %self.chat_id, "Telegram notification sent");
            return Ok(());
        }

        tracing::error!(
            chat_id = %self.chat_id,
            status = status.as_u16(),
            body = %text,
            "Telegram rejected notification"
        );

        let description = parsed
            .and_then(|r| r.description)
            .unwrap_or_else(|| "Unknown Telegram API error".to_string());

        Err(NotifyError::Api {
            status: status.as_u16(),
            description,
        })
    }

    fn channel_name(&self) -> &str {
        "telegram"
    }
}
