use crate::utils::error::BriefError;
use crate::web::views;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// 儀表板路由的錯誤
#[derive(Debug, Error)]
pub enum WebError {
    /// 表單內容無效
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] BriefError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WebError::Internal(e) => {
                tracing::error!(
                    "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                (StatusCode::INTERNAL_SERVER_ERROR, e.user_friendly_message())
            }
        };
        (status, Html(views::error_page(status.as_u16(), &message))).into_response()
    }
}

pub type WebResult<T> = std::result::Result<T, WebError>;
