//! users.yaml：儀表板與 add_user 寫入、推送任務讀取的使用者清單

use crate::config::restrict_to_owner;
use crate::config::toml_config::{DefaultsConfig, DEFAULT_RSS_LIMIT, DEFAULT_TIMEZONE};
use crate::domain::model::UserProfile;
use crate::utils::error::{BriefError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersFile {
    #[serde(default)]
    pub users: Vec<UserEntry>,
    /// 其他頂層鍵原樣保留
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// 單一使用者條目。`None` 代表未設定（繼承全域），
/// `Some(vec![])` 代表明確設定為空。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchlist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_feeds: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_limit: Option<usize>,
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl UserEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// 沒有 users.yaml 時推送任務使用的單一使用者
    pub fn single_sender() -> Self {
        Self {
            id: "single".to_string(),
            name: Some("single".to_string()),
            channel: Some("serverchan".to_string()),
            secrets: BTreeMap::from([(
                "SCT_SENDKEY".to_string(),
                "env:SCT_SENDKEY".to_string(),
            )]),
            ..Default::default()
        }
    }

    /// 沒有 users.yaml 時預覽使用的單一使用者
    pub fn single_preview() -> Self {
        Self {
            id: "single".to_string(),
            name: Some("single".to_string()),
            ..Default::default()
        }
    }

    /// 報告標題上的顯示名稱：name 非空時用 name，否則用 id
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }

    /// 淺合併：`other` 中有設定的欄位覆蓋目前值，其餘保留
    pub fn merge_from(&mut self, other: UserEntry) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.channel.is_some() {
            self.channel = other.channel;
        }
        if other.timezone.is_some() {
            self.timezone = other.timezone;
        }
        if other.watchlist.is_some() {
            self.watchlist = other.watchlist;
        }
        if other.rss_feeds.is_some() {
            self.rss_feeds = other.rss_feeds;
        }
        if other.rss_limit.is_some() {
            self.rss_limit = other.rss_limit;
        }
        if !other.secrets.is_empty() {
            self.secrets = other.secrets;
        }
        self.extra.extend(other.extra);
    }

    /// 套用「使用者欄位存在就用（即使為空），否則用全域，最後用內建值」的規則
    pub fn resolve(&self, defaults: &DefaultsConfig) -> UserProfile {
        let timezone = pick(&self.timezone, &defaults.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let watchlist = pick(&self.watchlist, &defaults.watchlist).unwrap_or_default();
        let rss_feeds = pick(&self.rss_feeds, &defaults.rss_feeds).unwrap_or_default();
        let rss_limit = pick(&self.rss_limit, &defaults.rss_limit).unwrap_or(DEFAULT_RSS_LIMIT);

        UserProfile {
            id: self.id.clone(),
            display_name: self.display_name().to_string(),
            channel: self
                .channel
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or("serverchan")
                .to_lowercase(),
            timezone,
            watchlist,
            rss_feeds,
            rss_limit,
            secrets: self.secrets.clone(),
        }
    }
}

fn pick<T: Clone>(user: &Option<T>, global: &Option<T>) -> Option<T> {
    user.clone().or_else(|| global.clone())
}

impl UsersFile {
    /// 讀取 users.yaml，不存在時回傳空清單
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Users file {} not found, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// 寫回 users.yaml，並把權限收緊為 600（內含密鑰）
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_yaml_string()?)?;
        restrict_to_owner(path);
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.id == id)
    }

    /// 依 id 更新（淺合併）或新增；回傳是否為更新
    pub fn upsert(&mut self, entry: UserEntry) -> bool {
        if let Some(existing) = self.users.iter_mut().find(|u| u.id == entry.id) {
            existing.merge_from(entry);
            true
        } else {
            self.users.push(entry);
            false
        }
    }

    /// 依 `--user` 過濾；指定了卻找不到時回傳 `UserNotFound`
    pub fn select(&self, only: Option<&str>) -> Result<Vec<UserEntry>> {
        match only {
            None => Ok(self.users.clone()),
            Some(id) => {
                let selected: Vec<UserEntry> =
                    self.users.iter().filter(|u| u.id == id).cloned().collect();
                if selected.is_empty() {
                    Err(BriefError::UserNotFound { id: id.to_string() })
                } else {
                    Ok(selected)
                }
            }
        }
    }
}
