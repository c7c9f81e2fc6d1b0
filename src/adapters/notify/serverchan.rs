use crate::adapters::notify::{http_client, outcome_from};
use crate::domain::model::SendOutcome;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;

const TIMEOUT_SECS: u64 = 12;

/// Server醬：`{base}/{sendkey}.send`，表單欄位 text/desp
pub struct ServerChanNotifier {
    client: Client,
    base_url: String,
    sendkey: String,
}

impl ServerChanNotifier {
    pub fn new(base_url: &str, sendkey: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(http_client(TIMEOUT_SECS)?, base_url, sendkey))
    }

    pub fn with_client(client: Client, base_url: &str, sendkey: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sendkey: sendkey.into(),
        }
    }
}

#[async_trait]
impl Notifier for ServerChanNotifier {
    fn channel_name(&self) -> &'static str {
        "serverchan"
    }

    async fn send(&self, title: &str, markdown: &str) -> SendOutcome {
        if self.sendkey.trim().is_empty() {
            return SendOutcome::not_sent("No SendKey");
        }

        let url = format!("{}/{}.send", self.base_url, self.sendkey.trim());
        let result = self
            .client
            .post(&url)
            .form(&[("text", title), ("desp", markdown)])
            .send()
            .await;
        outcome_from(result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_send_posts_form() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/SCT123.send")
                .header("content-type", "application/x-www-form-urlencoded")
                .x_www_form_urlencoded_tuple("text", "每日财经早报 | 2025-01-02 08:30")
                .x_www_form_urlencoded_tuple("desp", "# hi");
            then.status(200).body(r#"{"code":0}"#);
        });

        let notifier = ServerChanNotifier::with_client(Client::new(), &server.base_url(), "SCT123");
        let outcome = notifier.send("每日财经早报 | 2025-01-02 08:30", "# hi").await;

        api_mock.assert();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body, r#"{"code":0}"#);
    }

    #[tokio::test]
    async fn test_missing_key_is_not_sent() {
        let notifier = ServerChanNotifier::with_client(Client::new(), "http://127.0.0.1:9", "");
        let outcome = notifier.send("t", "m").await;
        assert_eq!(outcome, SendOutcome::not_sent("No SendKey"));
    }
}
