use crate::config::cli::LocalStorage;
use crate::domain::model::{Report, UserProfile};
use crate::domain::ports::{Delivery, ReportSink, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 預覽工具的投遞端：印到終端並存成 `{uid}_{YYYYmmdd_HHMM}.md`
pub struct PreviewSink {
    storage: LocalStorage,
}

impl PreviewSink {
    pub fn new(out_dir: impl Into<String>) -> Self {
        Self {
            storage: LocalStorage::new(out_dir.into()),
        }
    }

    pub fn file_name(uid: &str) -> String {
        format!("{}_{}.md", uid, chrono::Local::now().format("%Y%m%d_%H%M"))
    }
}

#[async_trait]
impl ReportSink for PreviewSink {
    async fn deliver(&self, user: &UserProfile, report: &Report) -> Result<Delivery> {
        println!("\n===== [PREVIEW] {} ({}) =====\n", user.id, report.meta.gen_time);
        println!("{}", report.markdown);

        let name = Self::file_name(&user.id);
        self.storage.write_file(&name, report.markdown.as_bytes()).await?;
        let path = self.storage.full_path(&name);
        println!("[PREVIEW] 已保存: {}", path);

        Ok(Delivery::Saved { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReportMeta;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_preview_saves_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let sink = PreviewSink::new(out_dir.display().to_string());

        let user = UserProfile {
            id: "eva".to_string(),
            display_name: "eva".to_string(),
            channel: "serverchan".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            watchlist: vec![],
            rss_feeds: vec![],
            rss_limit: 6,
            secrets: BTreeMap::new(),
        };
        let report = Report {
            markdown: "# 📈 eva的每日财经早报".to_string(),
            meta: ReportMeta {
                gen_time: "2025-01-02 08:30".to_string(),
                tz: "Asia/Shanghai".to_string(),
                watchlist_count: 0,
                rss_count: 0,
            },
        };

        let delivery = sink.deliver(&user, &report).await.unwrap();
        let Delivery::Saved { path } = delivery else {
            panic!("expected saved delivery");
        };
        assert!(path.contains("eva_"));
        assert!(path.ends_with(".md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# 📈 eva的每日财经早报");
    }
}
