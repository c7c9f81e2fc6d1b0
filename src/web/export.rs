//! 把資料庫中的使用者整批匯出成推送任務讀取的 users.yaml

use crate::config::users::{UserEntry, UsersFile};
use crate::domain::model::Channel;
use crate::utils::error::Result;
use crate::web::db::{Database, DbUser, Feed, Watch};
use std::collections::BTreeMap;
use std::path::Path;

/// 只匯出所選通道用得到的明文密鑰
fn channel_secrets(user: &DbUser) -> BTreeMap<String, String> {
    let mut secrets = BTreeMap::new();
    let mut put = |key: &str, value: &Option<String>| {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            secrets.insert(key.to_string(), v.to_string());
        }
    };
    match user.channel.parse::<Channel>() {
        Ok(Channel::ServerChan) => put("SCT_SENDKEY", &user.sct_sendkey),
        Ok(Channel::Telegram) => {
            put("BOT_TOKEN", &user.tg_bot_token);
            put("CHAT_ID", &user.tg_chat_id);
        }
        Ok(Channel::WeCom) => put("WEBHOOK", &user.wecom_webhook),
        Err(_) => {}
    }
    secrets
}

/// 儀表板使用者對應的 users.yaml 條目；預覽頁也用它，確保兩者一致
pub fn user_entry(user: &DbUser, watches: &[Watch], feeds: &[Feed]) -> UserEntry {
    UserEntry {
        name: Some(user.name.clone()),
        timezone: Some(user.timezone.clone()),
        channel: Some(user.channel.clone()),
        secrets: channel_secrets(user),
        watchlist: Some(watches.iter().map(|w| w.code.clone()).collect()),
        rss_feeds: Some(feeds.iter().map(|f| f.url.clone()).collect()),
        ..UserEntry::new(user.uid.clone())
    }
}

/// 以資料庫內容整檔覆寫 users.yaml（權限 600）
pub async fn export_users_yaml<P: AsRef<Path>>(db: &Database, path: P) -> Result<usize> {
    let mut file = UsersFile::default();
    for user in db.list_users().await? {
        let watches = db.watches_for(user.id).await?;
        let feeds = db.feeds_for(user.id).await?;
        file.users.push(user_entry(&user, &watches, &feeds));
    }

    file.save(path.as_ref())?;
    tracing::info!(
        "📤 Exported {} user(s) to {}",
        file.users.len(),
        path.as_ref().display()
    );
    Ok(file.users.len())
}
