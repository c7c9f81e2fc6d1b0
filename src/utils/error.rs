use thiserror::Error;

#[derive(Error, Debug)]
pub enum BriefError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[cfg(feature = "dashboard")]
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Fetch from {source_name} failed: {message}")]
    FetchError {
        source_name: String,
        message: String,
    },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("User not found: id='{id}'")]
    UserNotFound { id: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BriefError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BriefError::ApiError(_) | BriefError::FetchError { .. } => ErrorCategory::Network,
            BriefError::ConfigValidationError { .. }
            | BriefError::InvalidConfigValueError { .. }
            | BriefError::UserNotFound { .. } => ErrorCategory::Configuration,
            BriefError::SerializationError(_)
            | BriefError::YamlError(_)
            | BriefError::ParseError { .. }
            | BriefError::ValidationError { .. } => ErrorCategory::Data,
            BriefError::IoError(_) => ErrorCategory::Storage,
            #[cfg(feature = "dashboard")]
            BriefError::DatabaseError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BriefError::ValidationError { .. } => ErrorSeverity::Low,
            BriefError::ApiError(_) | BriefError::FetchError { .. } => ErrorSeverity::Medium,
            BriefError::IoError(_) => ErrorSeverity::Critical,
            #[cfg(feature = "dashboard")]
            BriefError::DatabaseError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 給使用者看的精簡訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            BriefError::UserNotFound { id } => format!("未找到用户 id='{}'", id),
            BriefError::InvalidConfigValueError { field, reason, .. } => {
                format!("配置项 {} 无效: {}", field, reason)
            }
            BriefError::ConfigValidationError { message, .. } => {
                format!("配置错误: {}", message)
            }
            BriefError::IoError(e) => format!("文件读写失败: {}", e),
            BriefError::YamlError(e) => format!("YAML 格式错误: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the source base URLs in the config file",
            ErrorCategory::Configuration => "Review finbrief.toml / users.yaml and fix the reported field",
            ErrorCategory::Data => "Inspect the input file for malformed content",
            ErrorCategory::Storage => "Check that the output paths exist and are writable",
        }
    }

    /// 依嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        if let BriefError::UserNotFound { .. } = self {
            return 2;
        }
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, BriefError>;

/// 命令列工具的統一失敗出口：記錄細節、印出友善訊息後依嚴重程度退出
pub fn exit_on_error(e: &BriefError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    if !matches!(e, BriefError::UserNotFound { .. }) {
        eprintln!("💡 建議: {}", e.recovery_suggestion());
    }
    std::process::exit(e.exit_code())
}
