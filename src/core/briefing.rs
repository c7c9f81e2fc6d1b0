use crate::config::toml_config::DefaultsConfig;
use crate::config::users::{UserEntry, UsersFile};
use crate::core::report::ReportGenerator;
use crate::domain::ports::{Delivery, MarketData, NewsSource, ReportSink};
use crate::utils::error::Result;

/// 回應內容在終端只顯示前 200 字
const RESPONSE_PREVIEW_CHARS: usize = 200;

/// users.yaml 沒有任何使用者時以 `fallback` 單人模式執行（此時忽略 `--user`）
pub fn select_users(file: &UsersFile, only: Option<&str>, fallback: UserEntry) -> Result<Vec<UserEntry>> {
    if file.users.is_empty() {
        tracing::info!("👤 No users configured, running single-user mode");
        return Ok(vec![fallback]);
    }
    file.select(only)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BriefingSummary {
    /// 已知通道的推送次數（含 status 0）
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: Vec<String>,
    pub saved: Vec<String>,
}

impl BriefingSummary {
    pub fn done_line(&self) -> String {
        format!("Done. success={}/{}", self.succeeded, self.attempted)
    }
}

/// 逐一為使用者產生早報並交給 sink
pub struct BriefingEngine<M: MarketData, N: NewsSource, S: ReportSink> {
    generator: ReportGenerator<M, N>,
    sink: S,
}

impl<M: MarketData, N: NewsSource, S: ReportSink> BriefingEngine<M, N, S> {
    pub fn new(generator: ReportGenerator<M, N>, sink: S) -> Self {
        Self { generator, sink }
    }

    pub async fn run(&self, users: &[UserEntry], defaults: &DefaultsConfig) -> Result<BriefingSummary> {
        tracing::info!("🚀 Starting briefing for {} user(s)", users.len());
        let mut summary = BriefingSummary::default();

        for entry in users {
            let profile = entry.resolve(defaults);
            let report = self.generator.generate(&profile).await;

            match self.sink.deliver(&profile, &report).await? {
                Delivery::Sent { channel, outcome } => {
                    println!(
                        "[{}:{}] resp={} {}...",
                        profile.id,
                        channel,
                        outcome.status,
                        outcome.preview(RESPONSE_PREVIEW_CHARS)
                    );
                    summary.attempted += 1;
                    if outcome.is_success() {
                        summary.succeeded += 1;
                    }
                }
                Delivery::Skipped { channel } => {
                    println!("[{}] 未知渠道：{}（未发送）", profile.id, channel);
                    summary.skipped.push(profile.id.clone());
                }
                Delivery::Saved { path } => summary.saved.push(path),
            }
        }

        tracing::info!(
            "✅ Briefing finished: {} sent ok, {} attempted, {} skipped, {} saved",
            summary.succeeded,
            summary.attempted,
            summary.skipped.len(),
            summary.saved.len()
        );
        Ok(summary)
    }
}
