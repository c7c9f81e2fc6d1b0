//! `.env` 讀寫：僅支援 KEY=VAL，作業系統環境變數優先

use crate::config::restrict_to_owner;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct EnvMap {
    vars: HashMap<String, String>,
}

impl EnvMap {
    /// 讀取 `.env`，再以行程環境變數覆蓋（方便臨時覆寫）
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let mut vars = read_env_file(path.as_ref());
        vars.extend(std::env::vars());
        Self { vars }
    }

    /// 只使用給定的鍵值，不讀取行程環境（測試與預覽使用）
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.vars
    }
}

/// 只讀 `.env` 檔案本身；檔案不存在或無法解析的行會被略過
pub fn read_env_file(path: &Path) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return vars;
    }

    match dotenvy::from_path_iter(path) {
        Ok(iter) => {
            for item in iter {
                match item {
                    Ok((key, value)) => {
                        vars.insert(key.trim().to_string(), value.trim().to_string());
                    }
                    Err(e) => tracing::debug!("Skipping malformed line in {}: {}", path.display(), e),
                }
            }
        }
        Err(e) => tracing::warn!("Failed to read {}: {}", path.display(), e),
    }
    vars
}

/// 在 `.env` 末尾追加尚不存在的變數佔位，不覆蓋已有值；回傳是否有改動
pub fn append_env_if_absent<P: AsRef<Path>>(path: P, pairs: &[(String, String)]) -> Result<bool> {
    let path = path.as_ref();
    let existing = read_env_file(path);

    let mut lines: Vec<String> = if path.exists() {
        std::fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let mut changed = false;
    for (key, placeholder) in pairs {
        if existing.contains_key(key) {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("# {} for new user (fill the real value):", key));
        lines.push(format!("{}={}", key, placeholder));
        changed = true;
    }

    if changed {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = format!("{}\n", lines.join("\n").trim_end());
        std::fs::write(path, content)?;
        restrict_to_owner(path);
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_env_file_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# comment\nSCT_SENDKEY=abc\n\nTG_BOT_TOKEN=123:xyz\n").unwrap();

        let vars = read_env_file(&path);
        assert_eq!(vars.get("SCT_SENDKEY").map(String::as_str), Some("abc"));
        assert_eq!(vars.get("TG_BOT_TOKEN").map(String::as_str), Some("123:xyz"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_process_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "FINBRIEF_TEST_OVERRIDE=file\nFINBRIEF_TEST_FILE_ONLY=yes\n").unwrap();
        std::env::set_var("FINBRIEF_TEST_OVERRIDE", "process");

        let env = EnvMap::load(&path);
        assert_eq!(env.get("FINBRIEF_TEST_OVERRIDE"), Some("process"));
        assert_eq!(env.get("FINBRIEF_TEST_FILE_ONLY"), Some("yes"));

        std::env::remove_var("FINBRIEF_TEST_OVERRIDE");
    }

    #[test]
    fn test_append_env_if_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "TG_BOT_TOKEN=real\n").unwrap();

        let pairs = vec![
            ("TG_BOT_TOKEN".to_string(), String::new()),
            ("TG_CHAT_ID_EVA".to_string(), String::new()),
        ];
        assert!(append_env_if_absent(&path, &pairs).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("TG_BOT_TOKEN=real\n"));
        assert!(content.contains("# TG_CHAT_ID_EVA for new user (fill the real value):"));
        assert!(content.ends_with("TG_CHAT_ID_EVA=\n"));
        assert_eq!(content.matches("TG_BOT_TOKEN=").count(), 1);

        // 第二次不再改動
        assert!(!append_env_if_absent(&path, &pairs).unwrap());
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let pairs = vec![("WECOM_HOOK_TEAM".to_string(), String::new())];

        assert!(append_env_if_absent(&path, &pairs).unwrap());
        let vars = read_env_file(&path);
        assert_eq!(vars.get("WECOM_HOOK_TEAM").map(String::as_str), Some(""));
    }
}
