//! 行情資料：東方財富為主、新浪為備援，全部盡力而為

pub mod eastmoney;
pub mod sina;

use crate::config::toml_config::SourcesConfig;
use crate::domain::model::{IndexQuote, NorthFlow, StockQuote};
use crate::domain::ports::MarketData;
use crate::domain::ticker::normalize_all;
use crate::utils::error::Result;
use async_trait::async_trait;
use eastmoney::EastmoneyClient;
use reqwest::Client;
use sina::SinaClient;
use std::time::Duration;

/// 早報固定展示的指數
#[derive(Debug, Clone, Copy)]
pub struct IndexTarget {
    pub code: &'static str,
    pub name: &'static str,
    /// 東方財富 secid（市場.代碼）
    pub secid: &'static str,
    /// 新浪簡版行情代碼
    pub sina_symbol: &'static str,
}

pub const INDEX_TARGETS: [IndexTarget; 3] = [
    IndexTarget {
        code: "000001",
        name: "上证指数",
        secid: "1.000001",
        sina_symbol: "s_sh000001",
    },
    IndexTarget {
        code: "399001",
        name: "深证成指",
        secid: "0.399001",
        sina_symbol: "s_sz399001",
    },
    IndexTarget {
        code: "399006",
        name: "创业板指",
        secid: "0.399006",
        sina_symbol: "s_sz399006",
    },
];

pub struct PublicQuotes {
    eastmoney: EastmoneyClient,
    sina: SinaClient,
}

impl PublicQuotes {
    pub fn new(sources: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(sources.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, sources))
    }

    pub fn with_client(client: Client, sources: &SourcesConfig) -> Self {
        Self {
            eastmoney: EastmoneyClient::new(client.clone(), sources.eastmoney_base.clone()),
            sina: SinaClient::new(client, sources.sina_base.clone()),
        }
    }
}

fn placeholders() -> Vec<IndexQuote> {
    INDEX_TARGETS
        .iter()
        .map(|t| IndexQuote::unavailable(t.name))
        .collect()
}

/// 依漲跌幅絕對值由大到小；未知漲跌排最後
pub fn sort_by_abs_change(quotes: &mut [StockQuote]) {
    quotes.sort_by(|a, b| {
        let ka = a.change_pct.map(f64::abs).unwrap_or(f64::NEG_INFINITY);
        let kb = b.change_pct.map(f64::abs).unwrap_or(f64::NEG_INFINITY);
        kb.total_cmp(&ka)
    });
}

#[async_trait]
impl MarketData for PublicQuotes {
    async fn index_snapshot(&self) -> Vec<IndexQuote> {
        match self.eastmoney.index_snapshot().await {
            Ok(quotes) if quotes.len() == INDEX_TARGETS.len() && quotes.iter().all(IndexQuote::has_price) => {
                return quotes;
            }
            Ok(quotes) => tracing::warn!(
                "⚠️ Eastmoney index snapshot incomplete ({} usable), falling back to sina",
                quotes.iter().filter(|q| q.has_price()).count()
            ),
            Err(e) => tracing::warn!("⚠️ Eastmoney index snapshot failed: {}, falling back to sina", e),
        }

        match self.sina.index_snapshot().await {
            Ok(quotes) if !quotes.is_empty() => quotes,
            Ok(_) => {
                tracing::warn!("⚠️ Sina index snapshot returned nothing");
                placeholders()
            }
            Err(e) => {
                tracing::warn!("⚠️ Sina index snapshot failed: {}", e);
                placeholders()
            }
        }
    }

    async fn north_flow(&self) -> NorthFlow {
        match self.eastmoney.north_flow().await {
            Ok(flow) => flow,
            Err(e) => {
                tracing::warn!("⚠️ North flow unavailable: {}", e);
                NorthFlow::default()
            }
        }
    }

    async fn watchlist(&self, codes: &[String]) -> Vec<StockQuote> {
        let symbols = normalize_all(codes.iter().map(String::as_str));
        if symbols.is_empty() {
            return Vec::new();
        }

        match self.sina.stock_quotes(&symbols).await {
            Ok(mut quotes) => {
                sort_by_abs_change(&mut quotes);
                quotes
            }
            Err(e) => {
                tracing::warn!("⚠️ Watchlist quotes failed: {}", e);
                Vec::new()
            }
        }
    }
}
