//! 三個推送通道與依使用者設定建構推送器的 sink

pub mod serverchan;
pub mod telegram;
pub mod wecom;

use crate::config::env::EnvMap;
use crate::config::toml_config::ChannelsConfig;
use crate::domain::model::{Channel, Report, SendOutcome, UserProfile};
use crate::domain::ports::{Delivery, Notifier, ReportSink};
use crate::domain::secrets::resolve_secret;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serverchan::ServerChanNotifier;
use std::collections::BTreeMap;
use std::time::Duration;
use telegram::TelegramNotifier;
use wecom::WeComNotifier;

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// 任何 HTTP 狀態都如實回傳；連線層錯誤記為 status 0
pub(crate) async fn outcome_from(result: reqwest::Result<reqwest::Response>) -> SendOutcome {
    match result {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            SendOutcome { status, body }
        }
        Err(e) => {
            tracing::warn!("⚠️ Push request failed: {}", e);
            SendOutcome::not_sent(e.to_string())
        }
    }
}

/// 依通道從使用者 secrets 與環境變數解析出憑證並建構推送器
pub fn build_notifier(
    channel: Channel,
    secrets: &BTreeMap<String, String>,
    env: &EnvMap,
    channels: &ChannelsConfig,
) -> Result<Box<dyn Notifier>> {
    let env = env.as_map();
    let notifier: Box<dyn Notifier> = match channel {
        Channel::ServerChan => Box::new(ServerChanNotifier::new(
            &channels.serverchan_base,
            resolve_secret(secrets, env, "SCT_SENDKEY", ""),
        )?),
        Channel::Telegram => Box::new(TelegramNotifier::new(
            &channels.telegram_base,
            resolve_secret(secrets, env, "BOT_TOKEN", ""),
            resolve_secret(secrets, env, "CHAT_ID", ""),
        )?),
        Channel::WeCom => Box::new(WeComNotifier::new(resolve_secret(secrets, env, "WEBHOOK", ""))?),
    };
    Ok(notifier)
}

/// 推送任務的投遞端；`dry_run` 時只記錄不送出
pub struct NotifySink {
    env: EnvMap,
    channels: ChannelsConfig,
    dry_run: bool,
}

impl NotifySink {
    pub fn new(env: EnvMap, channels: ChannelsConfig, dry_run: bool) -> Self {
        Self {
            env,
            channels,
            dry_run,
        }
    }
}

#[async_trait]
impl ReportSink for NotifySink {
    async fn deliver(&self, user: &UserProfile, report: &Report) -> Result<Delivery> {
        let channel = match user.channel.parse::<Channel>() {
            Ok(channel) => channel,
            Err(unknown) => {
                tracing::debug!("Unknown channel '{}' for user {}, skipped", unknown, user.id);
                return Ok(Delivery::Skipped {
                    channel: user.channel.clone(),
                });
            }
        };

        if self.dry_run {
            tracing::info!("📝 [dry-run] {} -> {}\n{}", user.id, channel, report.markdown);
            return Ok(Delivery::Sent {
                channel: channel.to_string(),
                outcome: SendOutcome::not_sent("dry-run"),
            });
        }

        let notifier = build_notifier(channel, &user.secrets, &self.env, &self.channels)?;
        let outcome = notifier.send(&report.title(), &report.markdown).await;
        Ok(Delivery::Sent {
            channel: notifier.channel_name().to_string(),
            outcome,
        })
    }
}
