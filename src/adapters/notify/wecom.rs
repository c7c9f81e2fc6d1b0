use crate::adapters::notify::{http_client, outcome_from};
use crate::domain::model::SendOutcome;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const TIMEOUT_SECS: u64 = 12;

/// 企業微信群機器人 webhook，markdown 訊息
pub struct WeComNotifier {
    client: Client,
    webhook: String,
}

impl WeComNotifier {
    pub fn new(webhook: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(http_client(TIMEOUT_SECS)?, webhook))
    }

    pub fn with_client(client: Client, webhook: impl Into<String>) -> Self {
        Self {
            client,
            webhook: webhook.into(),
        }
    }
}

#[async_trait]
impl Notifier for WeComNotifier {
    fn channel_name(&self) -> &'static str {
        "wecom"
    }

    async fn send(&self, title: &str, markdown: &str) -> SendOutcome {
        let webhook = self.webhook.trim();
        if webhook.is_empty() {
            return SendOutcome::not_sent("No WeCom webhook");
        }

        let result = self
            .client
            .post(webhook)
            .json(&json!({
                "msgtype": "markdown",
                "markdown": {"content": format!("**{}**\n\n{}", title, markdown)}
            }))
            .send()
            .await;
        outcome_from(result).await
    }
}
