use crate::domain::model::{IndexQuote, NewsItem, NorthFlow, Report, SendOutcome, StockQuote, UserProfile};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 報告落地用的寫入端
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 行情來源。實作必須盡力而為：失敗時回傳佔位或空值而不是錯誤。
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn index_snapshot(&self) -> Vec<IndexQuote>;
    async fn north_flow(&self) -> NorthFlow;
    async fn watchlist(&self, codes: &[String]) -> Vec<StockQuote>;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn headlines(&self, feeds: &[String], limit_per_feed: usize) -> Vec<NewsItem>;
}

// 儀表板以 `Arc<dyn ...>` 共用同一組來源
#[async_trait]
impl<T: MarketData + ?Sized> MarketData for Arc<T> {
    async fn index_snapshot(&self) -> Vec<IndexQuote> {
        (**self).index_snapshot().await
    }

    async fn north_flow(&self) -> NorthFlow {
        (**self).north_flow().await
    }

    async fn watchlist(&self, codes: &[String]) -> Vec<StockQuote> {
        (**self).watchlist(codes).await
    }
}

#[async_trait]
impl<T: NewsSource + ?Sized> NewsSource for Arc<T> {
    async fn headlines(&self, feeds: &[String], limit_per_feed: usize) -> Vec<NewsItem> {
        (**self).headlines(feeds, limit_per_feed).await
    }
}

/// 單一通道的推送器，憑證已在建構時解析完成
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel_name(&self) -> &'static str;
    async fn send(&self, title: &str, markdown: &str) -> SendOutcome;
}

/// 報告產生後的去處（推送或預覽存檔）
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, user: &UserProfile, report: &Report) -> Result<Delivery>;
}

/// 一次投遞的結果
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// 已嘗試推送（含未送出的 status 0）
    Sent {
        channel: String,
        outcome: SendOutcome,
    },
    /// 未知通道，未推送
    Skipped { channel: String },
    /// 預覽檔案路徑
    Saved { path: String },
}
