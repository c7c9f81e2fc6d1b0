//! A 股代碼規範化：任意形態 -> 帶前綴（sh600519 / sz000858）

use regex::Regex;
use std::sync::LazyLock;

static SIX_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{6})").expect("valid six digit regex"));

/// 上交所號段
const SH_PREFIXES: [&str; 7] = ["600", "601", "603", "605", "688", "689", "900"];

/// 把 `600519` / `SZ000858` / `sh.600036` 之類的輸入轉成帶前綴的小寫代碼。
///
/// 已有 `sh`/`sz` 前綴時以前綴為準，否則依號段判斷交易所。
/// 找不到 6 位數字時回傳 `None`。
pub fn normalize_to_prefixed(code_like: &str) -> Option<String> {
    let s = code_like.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    let digits = SIX_DIGITS.captures(&s)?.get(1)?.as_str();

    if s.starts_with("sh") {
        return Some(format!("sh{}", digits));
    }
    if s.starts_with("sz") {
        return Some(format!("sz{}", digits));
    }

    if SH_PREFIXES.iter().any(|p| digits.starts_with(p)) {
        Some(format!("sh{}", digits))
    } else {
        Some(format!("sz{}", digits))
    }
}

/// 取出代碼中的 6 位數字部分
pub fn code6(code_like: &str) -> Option<&str> {
    SIX_DIGITS
        .captures(code_like)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// 規範化一組代碼，丟棄無效項並保持首次出現的順序
pub fn normalize_all<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for code in codes {
        if let Some(norm) = normalize_to_prefixed(code.as_ref()) {
            if !out.contains(&norm) {
                out.push(norm);
            }
        }
    }
    out
}
