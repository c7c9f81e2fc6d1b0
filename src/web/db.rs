//! 儀表板的 SQLite 儲存：使用者、自選股、RSS 訂閱

use crate::utils::error::{BriefError, Result};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DbUser {
    pub id: i64,
    pub uid: String,
    pub name: String,
    pub password_hash: String,
    pub timezone: String,
    pub channel: String,
    pub sct_sendkey: Option<String>,
    pub tg_bot_token: Option<String>,
    pub tg_chat_id: Option<String>,
    pub wecom_webhook: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Watch {
    pub id: i64,
    pub user_id: i64,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Feed {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
}

/// 個人設定表單；空字串在寫入前已轉成 `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub timezone: String,
    pub channel: String,
    pub sct_sendkey: Option<String>,
    pub tg_bot_token: Option<String>,
    pub tg_chat_id: Option<String>,
    pub wecom_webhook: Option<String>,
}

pub const DUPLICATE_UID: &str = "ID 已存在";

const USER_COLUMNS: &str = "id, uid, name, password_hash, timezone, channel, sct_sendkey, \
     tg_bot_token, tg_chat_id, wecom_webhook, created_at";

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        tracing::info!("🗄️ Database ready at {}", path.as_ref().display());
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uid TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                timezone TEXT NOT NULL DEFAULT 'Asia/Shanghai',
                channel TEXT NOT NULL DEFAULT 'serverchan',
                sct_sendkey TEXT,
                tg_bot_token TEXT,
                tg_chat_id TEXT,
                wecom_webhook TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS watches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                code TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rss_feeds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                url TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_user_by_uid(&self, uid: &str) -> Result<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users WHERE uid = ?",
            USER_COLUMNS
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<DbUser>> {
        let users = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// 新增使用者，回傳資料列 id；uid 已存在時回傳 `ValidationError`
    pub async fn create_user(&self, uid: &str, name: &str, password_hash: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users (uid, name, password_hash) VALUES (?, ?, ?)")
            .bind(uid)
            .bind(name)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    BriefError::ValidationError {
                        message: DUPLICATE_UID.to_string(),
                    }
                }
                other => BriefError::from(other),
            })?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET timezone = ?, channel = ?, sct_sendkey = ?, tg_bot_token = ?,
                tg_chat_id = ?, wecom_webhook = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.timezone)
        .bind(&update.channel)
        .bind(&update.sct_sendkey)
        .bind(&update.tg_bot_token)
        .bind(&update.tg_chat_id)
        .bind(&update.wecom_webhook)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn watches_for(&self, user_id: i64) -> Result<Vec<Watch>> {
        let rows = sqlx::query_as::<_, Watch>(
            "SELECT id, user_id, code FROM watches WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn add_watch(&self, user_id: i64, code: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO watches (user_id, code) VALUES (?, ?)")
            .bind(user_id)
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// 只刪除屬於 `user_id` 的資料列；回傳是否有刪除
    pub async fn delete_watch(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM watches WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn feeds_for(&self, user_id: i64) -> Result<Vec<Feed>> {
        let rows = sqlx::query_as::<_, Feed>(
            "SELECT id, user_id, url FROM rss_feeds WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn add_feed(&self, user_id: i64, url: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO rss_feeds (user_id, url) VALUES (?, ?)")
            .bind(user_id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn delete_feed(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rss_feeds WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let (_dir, db) = open_temp().await;
        let id = db.create_user("eva", "Eva", "hash").await.unwrap();

        let user = db.find_user_by_uid("eva").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.timezone, "Asia/Shanghai");
        assert_eq!(user.channel, "serverchan");
        assert_eq!(user.sct_sendkey, None);
        assert!(db.find_user_by_uid("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_uid_is_rejected_by_schema() {
        let (_dir, db) = open_temp().await;
        db.create_user("eva", "Eva", "hash").await.unwrap();
        match db.create_user("eva", "Other", "hash").await {
            Err(BriefError::ValidationError { message }) => assert_eq!(message, DUPLICATE_UID),
            other => panic!("expected duplicate uid error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (_dir, db) = open_temp().await;
        let id = db.create_user("eva", "Eva", "hash").await.unwrap();
        let update = ProfileUpdate {
            timezone: "Asia/Tokyo".to_string(),
            channel: "telegram".to_string(),
            tg_bot_token: Some("123:abc".to_string()),
            tg_chat_id: Some("42".to_string()),
            ..Default::default()
        };
        db.update_profile(id, &update).await.unwrap();

        let user = db.find_user_by_uid("eva").await.unwrap().unwrap();
        assert_eq!(user.timezone, "Asia/Tokyo");
        assert_eq!(user.channel, "telegram");
        assert_eq!(user.tg_chat_id.as_deref(), Some("42"));
        assert_eq!(user.wecom_webhook, None);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let (_dir, db) = open_temp().await;
        let eva = db.create_user("eva", "Eva", "hash").await.unwrap();
        let bob = db.create_user("bob", "Bob", "hash").await.unwrap();
        let watch = db.add_watch(eva, "sh600519").await.unwrap();
        let feed = db.add_feed(eva, "https://feed.example.com").await.unwrap();

        assert!(!db.delete_watch(watch, bob).await.unwrap());
        assert!(!db.delete_feed(feed, bob).await.unwrap());
        assert_eq!(db.watches_for(eva).await.unwrap().len(), 1);

        assert!(db.delete_watch(watch, eva).await.unwrap());
        assert!(db.delete_feed(feed, eva).await.unwrap());
        assert!(db.watches_for(eva).await.unwrap().is_empty());
        assert!(db.feeds_for(eva).await.unwrap().is_empty());
    }
}
