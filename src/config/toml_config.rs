use crate::utils::error::{BriefError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";
pub const DEFAULT_RSS_LIMIT: usize = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: DefaultsConfig,
    pub paths: PathsConfig,
    pub sources: SourcesConfig,
    pub channels: ChannelsConfig,
}

/// 全域預設值；使用者沒有設定的欄位會繼承這裡
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub timezone: Option<String>,
    pub watchlist: Option<Vec<String>>,
    pub rss_feeds: Option<Vec<String>>,
    pub rss_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub users_file: String,
    pub env_file: String,
    pub out_dir: String,
    pub database: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            users_file: "users.yaml".to_string(),
            env_file: ".env".to_string(),
            out_dir: "out".to_string(),
            database: "finbrief.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub eastmoney_base: String,
    pub sina_base: String,
    pub timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            eastmoney_base: "https://push2.eastmoney.com".to_string(),
            sina_base: "https://hq.sinajs.cn".to_string(),
            timeout_seconds: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    pub serverchan_base: String,
    pub telegram_base: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            serverchan_base: "https://sctapi.ftqq.com".to_string(),
            telegram_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置；檔案不存在時使用全部預設值
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(BriefError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BriefError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SINA_BASE})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("sources.eastmoney_base", &self.sources.eastmoney_base)?;
        validation::validate_url("sources.sina_base", &self.sources.sina_base)?;
        validation::validate_url("channels.serverchan_base", &self.channels.serverchan_base)?;
        validation::validate_url("channels.telegram_base", &self.channels.telegram_base)?;

        validation::validate_path("paths.users_file", &self.paths.users_file)?;
        validation::validate_path("paths.env_file", &self.paths.env_file)?;
        validation::validate_path("paths.out_dir", &self.paths.out_dir)?;
        validation::validate_path("paths.database", &self.paths.database)?;

        validation::validate_positive_number(
            "sources.timeout_seconds",
            self.sources.timeout_seconds as usize,
            1,
        )?;

        if let Some(limit) = self.defaults.rss_limit {
            validation::validate_positive_number("defaults.rss_limit", limit, 1)?;
        }

        if let Some(tz) = &self.defaults.timezone {
            if tz.parse::<chrono_tz::Tz>().is_err() {
                return Err(BriefError::InvalidConfigValueError {
                    field: "defaults.timezone".to_string(),
                    value: tz.clone(),
                    reason: "Unknown IANA timezone".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
