use crate::domain::model::Channel;
use crate::domain::ticker::normalize_to_prefixed;
use crate::utils::error::BriefError;
use crate::utils::validation::{validate_feed_url, validate_user_id};
use crate::web::db::{DbUser, ProfileUpdate, DUPLICATE_UID};
use crate::web::error::{WebError, WebResult};
use crate::web::export::{export_users_yaml, user_entry};
use crate::web::password::{hash_password, verify_password};
use crate::web::session::{clear_cookie, session_cookie, sid_from_headers};
use crate::web::state::AppState;
use crate::web::views;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// 302 跳轉
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn found_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

/// 已登入的使用者；未登入時直接回應 302 /login
pub struct CurrentUser(pub DbUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Some(sid) = sid_from_headers(&parts.headers) else {
            return Err(found("/login"));
        };
        let Some(uid) = state.sessions.uid_for(&sid).await else {
            return Err(found("/login"));
        };
        match state.db.find_user_by_uid(&uid).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(found("/login")),
            Err(e) => Err(WebError::from(e).into_response()),
        }
    }
}

/// 表單驗證錯誤只顯示訊息本身
fn form_message(e: BriefError) -> String {
    match e {
        BriefError::ValidationError { message } => message,
        other => other.to_string(),
    }
}

async fn export(state: &AppState) -> WebResult<()> {
    export_users_yaml(&state.db, state.users_file()).await?;
    Ok(())
}

pub async fn health() -> Json<Value> {
    Json(json!({"ok": true}))
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(sid) = sid_from_headers(&headers) {
        if state.sessions.uid_for(&sid).await.is_some() {
            return found("/dashboard");
        }
    }
    found("/login")
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

pub async fn register_form() -> Html<String> {
    Html(views::register_page(""))
}

pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> WebResult<Response> {
    let uid = form.uid.trim();
    if let Err(e) = validate_user_id(uid) {
        return Ok(Html(views::register_page(&form_message(e))).into_response());
    }
    if state.db.find_user_by_uid(uid).await?.is_some() {
        return Ok(Html(views::register_page(DUPLICATE_UID)).into_response());
    }

    let name = match form.name.trim() {
        "" => uid,
        name => name,
    };
    let hash = hash_password(&form.password)?;
    // 與前面的檢查之間可能有同名註冊搶先寫入
    match state.db.create_user(uid, name, &hash).await {
        Ok(_) => {}
        Err(e @ BriefError::ValidationError { .. }) => {
            return Ok(Html(views::register_page(&form_message(e))).into_response());
        }
        Err(e) => return Err(e.into()),
    }
    tracing::info!("👤 Registered user {}", uid);

    let sid = state.sessions.create(uid).await;
    export(&state).await?;
    Ok(found_with_cookie("/dashboard", session_cookie(&sid)))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub uid: String,
    pub password: String,
}

pub async fn login_form() -> Html<String> {
    Html(views::login_page(""))
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> WebResult<Response> {
    let user = state.db.find_user_by_uid(form.uid.trim()).await?;
    match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => {
            let sid = state.sessions.create(&user.uid).await;
            tracing::info!("🔑 {} logged in", user.uid);
            Ok(found_with_cookie("/dashboard", session_cookie(&sid)))
        }
        _ => Ok(Html(views::login_page("账号或密码错误")).into_response()),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(sid) = sid_from_headers(&headers) {
        state.sessions.remove(&sid).await;
    }
    found_with_cookie("/login", clear_cookie())
}

pub async fn dashboard(State(state): State<AppState>, CurrentUser(me): CurrentUser) -> WebResult<Html<String>> {
    let watches = state.db.watches_for(me.id).await?;
    let feeds = state.db.feeds_for(me.id).await?;
    Ok(Html(views::dashboard_page(&me, &watches, &feeds)))
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub timezone: String,
    pub channel: String,
    #[serde(default)]
    pub sct_sendkey: String,
    #[serde(default)]
    pub tg_bot_token: String,
    #[serde(default)]
    pub tg_chat_id: String,
    #[serde(default)]
    pub wecom_webhook: String,
}

fn non_empty(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Form(form): Form<ProfileForm>,
) -> WebResult<Response> {
    let channel = form
        .channel
        .parse::<Channel>()
        .map_err(|c| WebError::BadRequest(format!("未知渠道：{}", c)))?;

    let update = ProfileUpdate {
        timezone: non_empty(&form.timezone).unwrap_or(me.timezone),
        channel: channel.to_string(),
        sct_sendkey: non_empty(&form.sct_sendkey),
        tg_bot_token: non_empty(&form.tg_bot_token),
        tg_chat_id: non_empty(&form.tg_chat_id),
        wecom_webhook: non_empty(&form.wecom_webhook),
    };
    state.db.update_profile(me.id, &update).await?;
    export(&state).await?;
    Ok(found("/dashboard"))
}

#[derive(Debug, Deserialize)]
pub struct WatchForm {
    pub code: String,
}

pub async fn add_watch(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Form(form): Form<WatchForm>,
) -> WebResult<Response> {
    let code = normalize_to_prefixed(&form.code).ok_or_else(|| WebError::BadRequest("无效代码".to_string()))?;
    state.db.add_watch(me.id, &code).await?;
    export(&state).await?;
    Ok(found("/dashboard"))
}

pub async fn delete_watch(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    if !state.db.delete_watch(id, me.id).await? {
        tracing::debug!("Watch {} not owned by {}, ignored", id, me.uid);
    }
    export(&state).await?;
    Ok(found("/dashboard"))
}

#[derive(Debug, Deserialize)]
pub struct FeedForm {
    pub url: String,
}

pub async fn add_feed(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Form(form): Form<FeedForm>,
) -> WebResult<Response> {
    let url = form.url.trim();
    validate_feed_url(url).map_err(|e| WebError::BadRequest(form_message(e)))?;
    state.db.add_feed(me.id, url).await?;
    export(&state).await?;
    Ok(found("/dashboard"))
}

pub async fn delete_feed(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    if !state.db.delete_feed(id, me.id).await? {
        tracing::debug!("Feed {} not owned by {}, ignored", id, me.uid);
    }
    export(&state).await?;
    Ok(found("/dashboard"))
}

pub async fn preview(State(state): State<AppState>, CurrentUser(me): CurrentUser) -> WebResult<Html<String>> {
    let watches = state.db.watches_for(me.id).await?;
    let feeds = state.db.feeds_for(me.id).await?;
    let profile = user_entry(&me, &watches, &feeds).resolve(&state.config.defaults);

    let report = state.generator.generate(&profile).await;
    Ok(Html(views::preview_page(&report.markdown)))
}
