use crate::config::toml_config::DEFAULT_TIMEZONE;
use crate::core::render::render_markdown;
use crate::domain::model::{Report, ReportMeta, UserProfile};
use crate::domain::ports::{MarketData, NewsSource};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// 解析 IANA 時區；無效時退回 Asia/Shanghai
pub fn resolve_timezone(name: &str) -> Tz {
    match name.trim().parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!("⚠️ Invalid timezone '{}', using {}", name, DEFAULT_TIMEZONE);
            chrono_tz::Asia::Shanghai
        }
    }
}

pub fn format_gen_time(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}

/// 為單一使用者抓取資料並組裝早報
pub struct ReportGenerator<M: MarketData, N: NewsSource> {
    market: M,
    news: N,
}

impl<M: MarketData, N: NewsSource> ReportGenerator<M, N> {
    pub fn new(market: M, news: N) -> Self {
        Self { market, news }
    }

    pub async fn generate(&self, user: &UserProfile) -> Report {
        self.generate_at(user, Utc::now()).await
    }

    pub async fn generate_at(&self, user: &UserProfile, now: DateTime<Utc>) -> Report {
        let tz = resolve_timezone(&user.timezone);
        let gen_time = format_gen_time(now, tz);

        tracing::info!(
            "📥 {}: fetching market data ({} codes, {} feeds)",
            user.id,
            user.watchlist.len(),
            user.rss_feeds.len()
        );
        let (indices, north, watchlist, news) = tokio::join!(
            self.market.index_snapshot(),
            self.market.north_flow(),
            self.market.watchlist(&user.watchlist),
            self.news.headlines(&user.rss_feeds, user.rss_limit),
        );

        let markdown = render_markdown(
            &gen_time,
            &indices,
            &north,
            &watchlist,
            &news,
            &user.display_name,
        );
        tracing::debug!("🔄 {}: rendered {} bytes", user.id, markdown.len());

        Report {
            markdown,
            meta: ReportMeta {
                gen_time,
                tz: tz.name().to_string(),
                watchlist_count: watchlist.len(),
                rss_count: news.len(),
            },
        }
    }
}
