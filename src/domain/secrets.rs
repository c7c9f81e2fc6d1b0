use std::collections::{BTreeMap, HashMap};

/// 以 `env:` 開頭的值代表間接引用環境變數
pub const ENV_REF_PREFIX: &str = "env:";

/// 解析使用者的通道密鑰。
///
/// `env:VAR` 從 `env` 中取 `VAR`，取不到時回傳 `default`；
/// 其他非空值視為明文；缺少或空字串時回傳 `default`。
pub fn resolve_secret(
    secrets: &BTreeMap<String, String>,
    env: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> String {
    let value = secrets.get(key).map(String::as_str).unwrap_or("");

    if let Some(var) = value.strip_prefix(ENV_REF_PREFIX) {
        return env
            .get(var.trim())
            .cloned()
            .unwrap_or_else(|| default.to_string());
    }

    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// 產生 `env:VAR` 形式的引用
pub fn env_ref(var: &str) -> String {
    format!("{}{}", ENV_REF_PREFIX, var)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> HashMap<String, String> {
        HashMap::from([
            ("SCT_SENDKEY_EVA".to_string(), "SCT123".to_string()),
            ("EMPTY_VAR".to_string(), String::new()),
        ])
    }

    #[test]
    fn test_env_reference_is_resolved() {
        let secrets = BTreeMap::from([(
            "SCT_SENDKEY".to_string(),
            "env: SCT_SENDKEY_EVA".to_string(),
        )]);
        assert_eq!(resolve_secret(&secrets, &env(), "SCT_SENDKEY", ""), "SCT123");
    }

    #[test]
    fn test_missing_env_var_falls_back_to_default() {
        let secrets = BTreeMap::from([("BOT_TOKEN".to_string(), "env:TG_BOT_TOKEN".to_string())]);
        assert_eq!(resolve_secret(&secrets, &env(), "BOT_TOKEN", "fallback"), "fallback");
    }

    #[test]
    fn test_present_but_empty_env_var_is_returned_as_is() {
        let secrets = BTreeMap::from([("WEBHOOK".to_string(), "env:EMPTY_VAR".to_string())]);
        assert_eq!(resolve_secret(&secrets, &env(), "WEBHOOK", "x"), "");
    }

    #[test]
    fn test_plaintext_and_missing_values() {
        let secrets = BTreeMap::from([
            ("CHAT_ID".to_string(), "123456".to_string()),
            ("BOT_TOKEN".to_string(), String::new()),
        ]);
        assert_eq!(resolve_secret(&secrets, &env(), "CHAT_ID", ""), "123456");
        assert_eq!(resolve_secret(&secrets, &env(), "BOT_TOKEN", "d"), "d");
        assert_eq!(resolve_secret(&secrets, &env(), "WEBHOOK", ""), "");
    }

    #[test]
    fn test_env_ref() {
        assert_eq!(env_ref("TG_CHAT_ID_EVA"), "env:TG_CHAT_ID_EVA");
    }
}
