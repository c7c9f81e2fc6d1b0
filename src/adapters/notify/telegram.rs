use crate::adapters::notify::{http_client, outcome_from};
use crate::domain::model::SendOutcome;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const TIMEOUT_SECS: u64 = 15;

/// Telegram Bot API `sendMessage`，純文字不設 parse_mode
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(base_url: &str, bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(
            http_client(TIMEOUT_SECS)?,
            base_url,
            bot_token,
            chat_id,
        ))
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel_name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, title: &str, markdown: &str) -> SendOutcome {
        if self.bot_token.trim().is_empty() || self.chat_id.trim().is_empty() {
            return SendOutcome::not_sent("No TG creds");
        }

        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token.trim());
        let result = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id.trim(),
                "text": format!("{}\n\n{}", title, markdown),
                "disable_web_page_preview": true
            }))
            .send()
            .await;
        outcome_from(result).await
    }
}
