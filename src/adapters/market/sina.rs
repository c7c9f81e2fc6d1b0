//! 新浪行情 `hq.sinajs.cn`：GBK 編碼的 `var hq_str_xxx="...";` 文字行

use crate::adapters::market::{IndexTarget, INDEX_TARGETS};
use crate::domain::model::{IndexQuote, StockQuote};
use crate::utils::error::{BriefError, Result};
use reqwest::Client;

const REFERER: &str = "https://finance.sina.com.cn";
const USER_AGENT: &str = "Mozilla/5.0";

pub struct SinaClient {
    client: Client,
    base_url: String,
}

impl SinaClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_lines(&self, symbols: &[String]) -> Result<String> {
        let url = format!("{}/?list={}", self.base_url, symbols.join(","));
        tracing::debug!("Requesting sina quotes: {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::REFERER, REFERER)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefError::FetchError {
                source_name: "sina".to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let bytes = response.bytes().await?;
        Ok(decode_gbk(&bytes))
    }

    /// 三大指數的簡版行情（`s_` 前綴）
    pub async fn index_snapshot(&self) -> Result<Vec<IndexQuote>> {
        let symbols: Vec<String> = INDEX_TARGETS.iter().map(|t| t.sina_symbol.to_string()).collect();
        let text = self.fetch_lines(&symbols).await?;
        Ok(parse_index_lines(&text, &INDEX_TARGETS))
    }

    /// 自選股完整行情；`codes` 必須已規範為 sh/sz 前綴
    pub async fn stock_quotes(&self, codes: &[String]) -> Result<Vec<StockQuote>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let text = self.fetch_lines(codes).await?;
        Ok(parse_stock_lines(&text))
    }
}

pub fn decode_gbk(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::GBK.decode(bytes);
    if had_errors {
        tracing::debug!("GBK decode replaced invalid sequences");
    }
    text.into_owned()
}

/// 拆出 `hq_str_<symbol>="<payload>"` 的 symbol 與 payload
fn split_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.split("hq_str_").nth(1)?;
    let (symbol, rest) = rest.split_once('=')?;
    let payload = rest.trim().trim_end_matches(';').trim_matches('"');
    Some((symbol.trim(), payload))
}

fn parse_number(field: Option<&&str>) -> Option<f64> {
    field
        .map(|s| s.trim().trim_end_matches('%'))
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

/// 簡版格式：名稱,現價,漲跌額,漲跌幅,成交量,成交額
pub fn parse_index_lines(text: &str, targets: &[IndexTarget]) -> Vec<IndexQuote> {
    let mut out = Vec::new();
    for target in targets {
        let line = text.lines().find_map(|line| {
            split_line(line).filter(|(symbol, _)| *symbol == target.sina_symbol)
        });
        let Some((_, payload)) = line else {
            continue;
        };
        let parts: Vec<&str> = payload.split(',').collect();
        if parts.len() < 2 {
            continue;
        }
        let Some(price) = parse_number(parts.get(1)) else {
            continue;
        };
        out.push(IndexQuote {
            name: target.name.to_string(),
            price: Some(price),
            change_pct: parse_number(parts.get(3)),
        });
    }
    out
}

/// 完整格式：名稱,今開,昨收,現價,最高,最低,...
pub fn parse_stock_lines(text: &str) -> Vec<StockQuote> {
    let mut out = Vec::new();
    for line in text.lines() {
        let Some((symbol, payload)) = split_line(line) else {
            continue;
        };
        let parts: Vec<&str> = payload.split(',').collect();
        if parts.len() < 4 || parts[0].trim().is_empty() {
            tracing::debug!("No quote for {}", symbol);
            continue;
        }
        let (Some(prev_close), Some(price)) = (parse_number(parts.get(2)), parse_number(parts.get(3)))
        else {
            continue;
        };
        // 停牌或開盤前現價為 0
        let price = Some(price).filter(|p| *p > 0.0);
        let change_pct = match price {
            Some(p) if prev_close > 0.0 => Some((p - prev_close) / prev_close * 100.0),
            _ => None,
        };
        out.push(StockQuote {
            code: symbol.to_lowercase(),
            name: parts[0].trim().to_string(),
            price,
            change_pct,
        });
    }
    out
}
