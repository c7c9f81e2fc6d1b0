use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 大盤指數快照；抓不到的值為 `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub name: String,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
}

impl IndexQuote {
    pub fn unavailable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            price: None,
            change_pct: None,
        }
    }

    pub fn has_price(&self) -> bool {
        self.price.map(f64::is_finite).unwrap_or(false)
    }
}

/// 北向資金淨流入（億元）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NorthFlow {
    pub date: String,
    pub net_in: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    /// 帶前綴代碼，例如 sh600519
    pub code: String,
    pub name: String,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub link: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    pub gen_time: String,
    pub tz: String,
    pub watchlist_count: usize,
    pub rss_count: usize,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub markdown: String,
    pub meta: ReportMeta,
}

impl Report {
    /// 推送時使用的標題
    pub fn title(&self) -> String {
        format!("每日财经早报 | {}", self.meta.gen_time)
    }
}

/// 推送通道
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    ServerChan,
    Telegram,
    WeCom,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::ServerChan, Channel::Telegram, Channel::WeCom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::ServerChan => "serverchan",
            Channel::Telegram => "telegram",
            Channel::WeCom => "wecom",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "serverchan" => Ok(Channel::ServerChan),
            "telegram" => Ok(Channel::Telegram),
            "wecom" => Ok(Channel::WeCom),
            other => Err(other.to_string()),
        }
    }
}

/// 一次推送的結果；`status == 0` 表示沒有真正送出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub status: u16,
    pub body: String,
}

impl SendOutcome {
    pub fn not_sent(reason: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// 日誌用的截斷回應
    pub fn preview(&self, max_chars: usize) -> String {
        self.body.chars().take(max_chars).collect()
    }
}

/// 合併全域預設後、實際用來產生報告的使用者設定
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    /// 原始通道字串，未知值在推送階段才報告
    pub channel: String,
    pub timezone: String,
    pub watchlist: Vec<String>,
    pub rss_feeds: Vec<String>,
    pub rss_limit: usize,
    pub secrets: BTreeMap<String, String>,
}
