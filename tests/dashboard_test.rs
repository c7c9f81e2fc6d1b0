#![cfg(feature = "dashboard")]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use finbrief::domain::model::{IndexQuote, NewsItem, NorthFlow, StockQuote};
use finbrief::domain::ports::{MarketData, NewsSource};
use finbrief::web::{app_router, db::Database, AppState};
use finbrief::{AppConfig, UsersFile};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct FixedMarket;

#[async_trait]
impl MarketData for FixedMarket {
    async fn index_snapshot(&self) -> Vec<IndexQuote> {
        vec![IndexQuote {
            name: "上证指数".to_string(),
            price: Some(3200.0),
            change_pct: Some(0.5),
        }]
    }

    async fn north_flow(&self) -> NorthFlow {
        NorthFlow::default()
    }

    async fn watchlist(&self, codes: &[String]) -> Vec<StockQuote> {
        codes
            .iter()
            .map(|c| StockQuote {
                code: c.clone(),
                name: format!("股票{}", c),
                price: Some(10.0),
                change_pct: Some(1.0),
            })
            .collect()
    }
}

/// 標題帶 HTML，用來確認預覽頁有轉義
struct HostileNews;

#[async_trait]
impl NewsSource for HostileNews {
    async fn headlines(&self, feeds: &[String], _limit: usize) -> Vec<NewsItem> {
        feeds
            .iter()
            .map(|f| NewsItem {
                title: "<script>alert(1)</script>".to_string(),
                link: "https://news.example.com/x".to_string(),
                time: String::new(),
                source: f.clone(),
            })
            .collect()
    }
}

struct TestApp {
    _dir: TempDir,
    router: Router,
    state: AppState,
    users_yaml: std::path::PathBuf,
}

impl TestApp {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let users_yaml = dir.path().join("users.yaml");

        let mut config = AppConfig::default();
        config.paths.users_file = users_yaml.display().to_string();
        config.paths.database = dir.path().join("finbrief.db").display().to_string();

        let db = Database::open(&config.paths.database).await.unwrap();
        let state = AppState::new(db, config, Arc::new(FixedMarket), Arc::new(HostileNews));

        Self {
            router: app_router(state.clone()),
            state,
            users_yaml,
            _dir: dir,
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.router
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.router
            .clone()
            .oneshot(req.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// 註冊並回傳可直接放進 Cookie 標頭的 `sid=...`
    async fn register(&self, uid: &str) -> String {
        let resp = self
            .post("/register", &format!("uid={}&name=&password=secret", uid), None)
            .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/dashboard");
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn exported(&self) -> UsersFile {
        UsersFile::load(&self.users_yaml).unwrap()
    }
}

fn location(resp: &Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::start().await;
    let resp = app.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let app = TestApp::start().await;

    for uri in ["/", "/dashboard", "/preview"] {
        let resp = app.get(uri, None).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(location(&resp), "/login");
    }

    let resp = app.post("/watch/add", "code=600519", Some("sid=forged")).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_register_logs_in_and_exports() {
    let app = TestApp::start().await;
    let cookie = app.register("eva").await;

    let resp = app.get("/", Some(&cookie)).await;
    assert_eq!(location(&resp), "/dashboard");

    let resp = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("eva"));

    let file = app.exported();
    assert_eq!(file.users.len(), 1);
    let eva = &file.users[0];
    assert_eq!(eva.id, "eva");
    assert_eq!(eva.name.as_deref(), Some("eva"));
    assert_eq!(eva.channel.as_deref(), Some("serverchan"));
    assert_eq!(eva.timezone.as_deref(), Some("Asia/Shanghai"));
    assert_eq!(eva.watchlist, Some(vec![]));
}

#[tokio::test]
async fn test_register_rejects_bad_and_duplicate_ids() {
    let app = TestApp::start().await;
    app.register("eva").await;

    let resp = app.post("/register", "uid=eva&password=x", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("ID 已存在"));

    let resp = app.post("/register", "uid=a%21&password=x", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("ID 仅限2-32位字母数字-_"));
}

#[tokio::test]
async fn test_concurrent_register_same_id_shows_form_message() {
    let app = TestApp::start().await;
    let form = "uid=eva&password=secret";
    let (a, b) = tokio::join!(app.post("/register", form, None), app.post("/register", form, None));

    let mut statuses = vec![a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::FOUND]);

    let loser = if a.status() == StatusCode::OK { a } else { b };
    assert!(body_text(loser).await.contains("ID 已存在"));
    assert_eq!(app.exported().users.len(), 1);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = TestApp::start().await;
    app.register("eva").await;

    let resp = app.post("/login", "uid=eva&password=wrong", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("账号或密码错误"));

    let resp = app.post("/login", "uid=eva&password=secret", None).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let resp = app.get("/logout", Some(&cookie)).await;
    assert_eq!(location(&resp), "/login");
    let resp = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_watch_and_feed_validation() {
    let app = TestApp::start().await;
    let cookie = app.register("eva").await;

    let resp = app.post("/watch/add", "code=abc", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("无效代码"));

    let resp = app.post("/watch/add", "code=600519", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = app.post("/rss/add", "url=ftp%3A%2F%2Ffeed", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .post("/rss/add", "url=https%3A%2F%2Ffeed.example.com%2Frss", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let eva = &app.exported().users[0];
    assert_eq!(eva.watchlist, Some(vec!["sh600519".to_string()]));
    assert_eq!(eva.rss_feeds, Some(vec!["https://feed.example.com/rss".to_string()]));
}

#[tokio::test]
async fn test_delete_is_owner_only() {
    let app = TestApp::start().await;
    let eva_cookie = app.register("eva").await;
    let bob_cookie = app.register("bob").await;

    app.post("/watch/add", "code=sz000858", Some(&eva_cookie)).await;
    let eva = app.state.db.find_user_by_uid("eva").await.unwrap().unwrap();
    let watch_id = app.state.db.watches_for(eva.id).await.unwrap()[0].id;

    let resp = app
        .post(&format!("/watch/del/{}", watch_id), "", Some(&bob_cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(app.state.db.watches_for(eva.id).await.unwrap().len(), 1);

    app.post(&format!("/watch/del/{}", watch_id), "", Some(&eva_cookie))
        .await;
    assert!(app.state.db.watches_for(eva.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_update_exports_channel_secrets() {
    let app = TestApp::start().await;
    let cookie = app.register("eva").await;

    let resp = app.post("/profile", "timezone=&channel=pigeon", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .post(
            "/profile",
            "timezone=Asia%2FTokyo&channel=telegram&sct_sendkey=SCT1&tg_bot_token=123%3Aabc&tg_chat_id=42&wecom_webhook=",
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let eva = &app.exported().users[0];
    assert_eq!(eva.channel.as_deref(), Some("telegram"));
    assert_eq!(eva.timezone.as_deref(), Some("Asia/Tokyo"));
    assert_eq!(eva.secrets.get("BOT_TOKEN").map(String::as_str), Some("123:abc"));
    assert_eq!(eva.secrets.get("CHAT_ID").map(String::as_str), Some("42"));
    assert!(!eva.secrets.contains_key("SCT_SENDKEY"));

    // 時區留空沿用原值
    app.post("/profile", "timezone=&channel=wecom", Some(&cookie)).await;
    let user = app.state.db.find_user_by_uid("eva").await.unwrap().unwrap();
    assert_eq!(user.timezone, "Asia/Tokyo");
    assert_eq!(user.wecom_webhook, None);
}

#[tokio::test]
async fn test_preview_uses_own_lists_and_escapes_html() {
    let app = TestApp::start().await;
    let cookie = app.register("eva").await;
    app.post("/watch/add", "code=600519", Some(&cookie)).await;
    app.post("/rss/add", "url=https%3A%2F%2Ffeed.example.com", Some(&cookie))
        .await;

    let resp = app.get("/preview", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;

    assert!(html.contains("<pre>"));
    assert!(html.contains("股票sh600519(sh600519)"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>alert(1)"));
}
