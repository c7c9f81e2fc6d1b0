use crate::utils::error::{BriefError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-]{2,32}$").expect("valid user id regex"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BriefError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BriefError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(BriefError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BriefError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BriefError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(BriefError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BriefError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 使用者 ID 只允許 2-32 位英數字與 `-` `_`
pub fn validate_user_id(value: &str) -> Result<()> {
    if USER_ID_RE.is_match(value) {
        Ok(())
    } else {
        Err(BriefError::ValidationError {
            message: "ID 仅限2-32位字母数字-_".to_string(),
        })
    }
}

/// RSS 位址只接受 http/https 開頭
pub fn validate_feed_url(value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(BriefError::ValidationError {
            message: "RSS 必须是 http/https 链接".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.sina_base", "https://hq.sinajs.cn").is_ok());
        assert!(validate_url("sources.sina_base", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("sources.sina_base", "").is_err());
        assert!(validate_url("sources.sina_base", "invalid-url").is_err());
        assert!(validate_url("sources.sina_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("defaults.rss_limit", 6, 1).is_ok());
        assert!(validate_positive_number("defaults.rss_limit", 0, 1).is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("eva").is_ok());
        assert!(validate_user_id("team_a-1").is_ok());
        assert!(validate_user_id("x").is_err());
        assert!(validate_user_id("has space").is_err());
        assert!(validate_user_id(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_feed_url() {
        assert!(validate_feed_url("https://example.com/rss").is_ok());
        assert!(validate_feed_url("http://example.com/rss").is_ok());
        assert!(validate_feed_url("ftp://example.com/rss").is_err());
        assert!(validate_feed_url("example.com").is_err());
    }
}
