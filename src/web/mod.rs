//! 自助註冊與設定的網頁儀表板

pub mod db;
pub mod error;
pub mod export;
pub mod handlers;
pub mod password;
pub mod session;
pub mod state;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::index))
        .route("/register", get(handlers::register_form).post(handlers::register))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/profile", post(handlers::update_profile))
        .route("/watch/add", post(handlers::add_watch))
        .route("/watch/del/{id}", post(handlers::delete_watch))
        .route("/rss/add", post(handlers::add_feed))
        .route("/rss/del/{id}", post(handlers::delete_feed))
        .route("/preview", get(handlers::preview))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
