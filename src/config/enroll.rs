//! add_user 的核心：組出使用者條目、寫回 users.yaml、在 .env 追加佔位

use crate::config::env::append_env_if_absent;
use crate::config::users::{UserEntry, UsersFile};
use crate::domain::model::Channel;
use crate::domain::secrets::env_ref;
use crate::domain::ticker::normalize_all;
use crate::utils::error::{BriefError, Result};
use crate::utils::validation::validate_non_empty_string;
use std::collections::BTreeMap;
use std::path::Path;

/// 各通道密鑰對應的環境變數名稱；未指定時使用預設命名
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvNames {
    pub sendkey: Option<String>,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub webhook: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: String,
    pub name: Option<String>,
    pub channel: Channel,
    pub timezone: Option<String>,
    /// `None` 代表未提供，寫入時省略以繼承全域
    pub watchlist: Option<Vec<String>>,
    pub rss_feeds: Option<Vec<String>>,
    pub env_names: EnvNames,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrollOutcome {
    /// true 表示更新既有使用者
    pub updated: bool,
    pub env_changed: bool,
    pub env_keys: Vec<String>,
}

/// 空格或逗號（含全形）分隔
pub fn split_items(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',' || c == '，')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 命令列清單：給了旗標但沒有值時為 `Some(vec![])`，明確設為空
pub fn list_from_args(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values.map(|items| split_items(&items.join(" ")))
}

/// 互動輸入：留空視為未提供（繼承全域）
pub fn list_from_answer(answer: &str) -> Option<Vec<String>> {
    Some(split_items(answer)).filter(|items| !items.is_empty())
}

/// 空字串視為未提供
fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Enrollment {
    /// 解析命令列或互動輸入的通道字串；空值為 serverchan
    pub fn parse_channel(raw: Option<&str>) -> Result<Channel> {
        match raw.map(str::trim).filter(|c| !c.is_empty()) {
            None => Ok(Channel::ServerChan),
            Some(c) => c.parse::<Channel>().map_err(|value| BriefError::InvalidConfigValueError {
                field: "channel".to_string(),
                value,
                reason: "must be one of serverchan, telegram, wecom".to_string(),
            }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_non_empty_string("id", &self.id)
    }

    /// 依通道回傳 (secret 鍵, 環境變數名)
    pub fn secret_vars(&self) -> Vec<(&'static str, String)> {
        let upper = self.id.trim().to_uppercase();
        let names = &self.env_names;
        match self.channel {
            Channel::ServerChan => vec![(
                "SCT_SENDKEY",
                given(&names.sendkey)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("SCT_SENDKEY_{}", upper)),
            )],
            Channel::Telegram => vec![
                (
                    "BOT_TOKEN",
                    given(&names.bot_token).unwrap_or("TG_BOT_TOKEN").to_string(),
                ),
                (
                    "CHAT_ID",
                    given(&names.chat_id)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("TG_CHAT_ID_{}", upper)),
                ),
            ],
            Channel::WeCom => vec![(
                "WEBHOOK",
                given(&names.webhook).unwrap_or("WECOM_HOOK_TEAM").to_string(),
            )],
        }
    }

    /// 只寫入明確提供的欄位，其餘留給全域繼承
    pub fn to_entry(&self) -> UserEntry {
        let id = self.id.trim().to_string();
        let name = given(&self.name).unwrap_or(&id).to_string();
        let secrets: BTreeMap<String, String> = self
            .secret_vars()
            .into_iter()
            .map(|(key, var)| (key.to_string(), env_ref(&var)))
            .collect();

        UserEntry {
            name: Some(name),
            channel: Some(self.channel.to_string()),
            timezone: given(&self.timezone).map(str::to_string),
            watchlist: self.watchlist.as_ref().map(normalize_all),
            rss_feeds: self.rss_feeds.clone(),
            secrets,
            ..UserEntry::new(id)
        }
    }

    pub fn apply<P: AsRef<Path>, Q: AsRef<Path>>(&self, users_path: P, env_path: Q) -> Result<EnrollOutcome> {
        self.validate()?;

        let mut file = UsersFile::load(users_path.as_ref())?;
        let updated = file.upsert(self.to_entry());
        file.save(users_path.as_ref())?;
        tracing::info!(
            "👤 {} user '{}' in {}",
            if updated { "Updated" } else { "Added" },
            self.id.trim(),
            users_path.as_ref().display()
        );

        let pairs: Vec<(String, String)> = self
            .secret_vars()
            .into_iter()
            .map(|(_, var)| (var, String::new()))
            .collect();
        let env_changed = append_env_if_absent(env_path.as_ref(), &pairs)?;

        Ok(EnrollOutcome {
            updated,
            env_changed,
            env_keys: pairs.into_iter().map(|(k, _)| k).collect(),
        })
    }
}
