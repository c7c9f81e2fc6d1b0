//! 東方財富 `push2` JSON 介面

use crate::adapters::market::INDEX_TARGETS;
use crate::domain::model::{IndexQuote, NorthFlow};
use crate::utils::error::{BriefError, Result};
use reqwest::Client;
use serde_json::Value;

pub struct EastmoneyClient {
    client: Client,
    base_url: String,
}

impl EastmoneyClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Requesting eastmoney: {}", url);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BriefError::FetchError {
                source_name: "eastmoney".to_string(),
                message: format!("HTTP {} for {}", status, path),
            });
        }
        Ok(response.json::<Value>().await?)
    }

    /// 三大指數，依固定順序回傳；缺少的指數不補位
    pub async fn index_snapshot(&self) -> Result<Vec<IndexQuote>> {
        let secids: Vec<&str> = INDEX_TARGETS.iter().map(|t| t.secid).collect();
        let json = self
            .get_json(
                "/api/qt/ulist.np/get",
                &[
                    ("fltt", "2".to_string()),
                    ("secids", secids.join(",")),
                    ("fields", "f12,f14,f2,f3".to_string()),
                ],
            )
            .await?;
        parse_index_snapshot(&json)
    }

    pub async fn north_flow(&self) -> Result<NorthFlow> {
        let json = self
            .get_json(
                "/api/qt/kamt/get",
                &[
                    ("fields1", "f1,f2,f3,f4".to_string()),
                    ("fields2", "f51,f52,f53,f54,f63".to_string()),
                ],
            )
            .await?;
        parse_north_flow(&json)
    }
}

/// 介面在停牌或無資料時以 `"-"` 代替數字
fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

pub fn parse_index_snapshot(json: &Value) -> Result<Vec<IndexQuote>> {
    let diff = json
        .pointer("/data/diff")
        .and_then(Value::as_array)
        .ok_or_else(|| BriefError::ParseError {
            message: "eastmoney ulist response has no data.diff".to_string(),
        })?;

    let mut out = Vec::new();
    for target in INDEX_TARGETS.iter() {
        let row = diff
            .iter()
            .find(|row| row.get("f12").and_then(Value::as_str) == Some(target.code));
        if let Some(row) = row {
            out.push(IndexQuote {
                name: target.name.to_string(),
                price: as_number(row.get("f2")),
                change_pct: as_number(row.get("f3")),
            });
        }
    }
    Ok(out)
}

/// 滬股通 + 深股通當日淨流入，單位萬元換算為億元
pub fn parse_north_flow(json: &Value) -> Result<NorthFlow> {
    let data = json.get("data").filter(|d| !d.is_null()).ok_or_else(|| BriefError::ParseError {
        message: "eastmoney kamt response has no data".to_string(),
    })?;

    let sh = as_number(data.pointer("/hk2sh/dayNetAmtIn"));
    let sz = as_number(data.pointer("/hk2sz/dayNetAmtIn"));
    let net_in = match (sh, sz) {
        (None, None) => None,
        (a, b) => Some((a.unwrap_or(0.0) + b.unwrap_or(0.0)) / 10_000.0),
    };

    let date = ["/hk2sh/date2", "/hk2sz/date2"]
        .iter()
        .find_map(|p| data.pointer(p).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    Ok(NorthFlow { date, net_in })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn ulist_body() -> Value {
        json!({
            "rc": 0,
            "data": {
                "total": 3,
                "diff": [
                    {"f2": 10123.4, "f3": -0.49, "f12": "399001", "f14": "深证成指"},
                    {"f2": 3210.55, "f3": 0.38, "f12": "000001", "f14": "上证指数"},
                    {"f2": 2010.01, "f3": 0.15, "f12": "399006", "f14": "创业板指"}
                ]
            }
        })
    }

    #[test]
    fn test_parse_index_snapshot_keeps_fixed_order() {
        let quotes = parse_index_snapshot(&ulist_body()).unwrap();
        let names: Vec<&str> = quotes.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["上证指数", "深证成指", "创业板指"]);
        assert_eq!(quotes[0].price, Some(3210.55));
        assert_eq!(quotes[1].change_pct, Some(-0.49));
    }

    #[test]
    fn test_parse_index_snapshot_dash_is_unknown() {
        let body = json!({"data": {"diff": [{"f2": "-", "f3": "-", "f12": "000001"}]}});
        let quotes = parse_index_snapshot(&body).unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(!quotes[0].has_price());
    }

    #[test]
    fn test_parse_index_snapshot_without_data_is_error() {
        let body = json!({"rc": 102, "data": null});
        assert!(parse_index_snapshot(&body).is_err());
    }

    #[test]
    fn test_parse_north_flow_sums_both_connects() {
        let body = json!({
            "data": {
                "hk2sh": {"date2": "2025-01-02", "dayNetAmtIn": 123456.0},
                "hk2sz": {"date2": "2025-01-02", "dayNetAmtIn": -23456.0}
            }
        });
        let flow = parse_north_flow(&body).unwrap();
        assert_eq!(flow.date, "2025-01-02");
        assert!((flow.net_in.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_north_flow_missing_values() {
        let body = json!({"data": {"hk2sh": {"date2": "2025-01-02"}, "hk2sz": {}}});
        let flow = parse_north_flow(&body).unwrap();
        assert_eq!(flow.net_in, None);
        assert_eq!(flow.date, "2025-01-02");
    }

    #[tokio::test]
    async fn test_index_snapshot_over_http() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/qt/ulist.np/get")
                .query_param("fltt", "2")
                .query_param("secids", "1.000001,0.399001,0.399006");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(ulist_body());
        });

        let client = EastmoneyClient::new(Client::new(), server.base_url());
        let quotes = client.index_snapshot().await.unwrap();

        api_mock.assert();
        assert_eq!(quotes.len(), 3);
        assert!(quotes.iter().all(IndexQuote::has_price));
    }
}
