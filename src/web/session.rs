//! 記憶體內的登入會話：sid -> uid，重啟即失效

use axum::http::{header, HeaderMap};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const COOKIE_NAME: &str = "sid";
const MAX_AGE_SECS: u64 = 7 * 24 * 3600;
const TOKEN_LEN: usize = 32;

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建立新會話並回傳 sid
    pub async fn create(&self, uid: &str) -> String {
        let sid: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        self.inner.write().await.insert(sid.clone(), uid.to_string());
        sid
    }

    pub async fn uid_for(&self, sid: &str) -> Option<String> {
        self.inner.read().await.get(sid).cloned()
    }

    pub async fn remove(&self, sid: &str) {
        self.inner.write().await.remove(sid);
    }
}

/// 從 Cookie 標頭取出 sid
pub fn sid_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(sid: &str) -> String {
    format!(
        "{}={}; HttpOnly; Max-Age={}; SameSite=Lax; Path=/",
        COOKIE_NAME, sid, MAX_AGE_SECS
    )
}

pub fn clear_cookie() -> String {
    format!("{}=; HttpOnly; Max-Age=0; SameSite=Lax; Path=/", COOKIE_NAME)
}
