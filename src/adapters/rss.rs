//! RSS 2.0 `<item>` 與 Atom `<entry>` 標題抓取

use crate::domain::model::NewsItem;
use crate::domain::ports::NewsSource;
use crate::utils::error::{BriefError, Result};
use async_trait::async_trait;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use reqwest::Client;
use std::time::Duration;

const NO_TITLE: &str = "(no title)";
const FEED_TIMEOUT_SECS: u64 = 10;

/// 解析 feed，最多取 `limit` 筆；`source` 記錄 feed URL
pub fn parse_feed(xml: &[u8], feed_url: &str, limit: usize) -> Result<Vec<NewsItem>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    let mut current: Option<EntryBuilder> = None;
    // item/entry 之內開啟中的元素層數；1 代表直接子元素
    let mut depth = 0usize;
    let mut current_element = String::new();

    loop {
        if items.len() >= limit {
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                match current {
                    None if name == "item" || name == "entry" => {
                        current = Some(EntryBuilder::default());
                        depth = 0;
                    }
                    None => {}
                    Some(ref mut entry) => {
                        depth += 1;
                        if depth == 1 && name == "link" {
                            entry.take_href(&e);
                        }
                    }
                }
                current_element = name;
            }
            Ok(Event::Empty(e)) => {
                // Atom: <link href="..." rel="alternate"/>
                if let Some(ref mut entry) = current {
                    if depth == 0 && local_name(&e) == "link" {
                        entry.take_href(&e);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if current.is_some() {
                    if depth == 0 {
                        if let Some(entry) = current.take() {
                            items.push(entry.build(feed_url));
                        }
                    } else {
                        depth -= 1;
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                if depth == 1 {
                    on_text(&mut current, &current_element, text_of(&e));
                }
            }
            Ok(Event::CData(e)) => {
                if depth == 1 {
                    let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                    on_text(&mut current, &current_element, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BriefError::ParseError {
                    message: format!("XML parse error in {}: {}", feed_url, e),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

/// XML 預定義實體之外，補上財經 feed 常見的 HTML 實體
fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or(match name {
        "nbsp" => Some(" "),
        "ldquo" => Some("“"),
        "rdquo" => Some("”"),
        "lsquo" => Some("‘"),
        "rsquo" => Some("’"),
        "hellip" => Some("…"),
        "middot" => Some("·"),
        "mdash" => Some("—"),
        _ => None,
    })
}

/// 仍有無法辨識的實體時保留原文
fn text_of(e: &BytesText<'_>) -> String {
    match e.unescape_with(resolve_entity) {
        Ok(text) => text.into_owned(),
        Err(err) => {
            tracing::debug!("Keeping raw feed text: {}", err);
            String::from_utf8_lossy(e).into_owned()
        }
    }
}

/// 只收集 item/entry 直接子元素的文字，頻道層級與巢狀元素忽略
fn on_text(current: &mut Option<EntryBuilder>, element: &str, text: String) {
    let Some(entry) = current else {
        return;
    };
    if text.is_empty() {
        return;
    }
    match element {
        "title" => entry.title.push_str(&text),
        "link" if entry.link.is_none() => entry.link = Some(text.trim().to_string()),
        "pubDate" | "published" | "updated" if entry.time.is_none() => {
            entry.time = Some(text.trim().to_string())
        }
        _ => {}
    }
}

#[derive(Default)]
struct EntryBuilder {
    title: String,
    link: Option<String>,
    time: Option<String>,
}

impl EntryBuilder {
    fn take_href(&mut self, e: &BytesStart<'_>) {
        if self.link.is_some() {
            return;
        }
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"href" {
                self.link = Some(String::from_utf8_lossy(&attr.value).to_string());
            }
        }
    }

    fn build(self, source: &str) -> NewsItem {
        let title = self.title.trim();
        NewsItem {
            source: source.to_string(),
            title: if title.is_empty() {
                NO_TITLE.to_string()
            } else {
                title.to_string()
            },
            link: self.link.unwrap_or_default(),
            time: self.time.unwrap_or_default(),
        }
    }
}

pub struct RssClient {
    client: Client,
}

impl RssClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str, limit: usize) -> Result<Vec<NewsItem>> {
        tracing::debug!("Fetching RSS feed from: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BriefError::FetchError {
                source_name: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let bytes = response.bytes().await?;
        let items = parse_feed(&bytes, url, limit)?;
        tracing::debug!("Parsed {} items from {}", items.len(), url);
        Ok(items)
    }
}

#[async_trait]
impl NewsSource for RssClient {
    async fn headlines(&self, feeds: &[String], limit_per_feed: usize) -> Vec<NewsItem> {
        let mut out = Vec::new();
        for url in feeds {
            match self.fetch(url, limit_per_feed).await {
                Ok(items) => out.extend(items),
                Err(e) => tracing::warn!("⚠️ Skipping feed {}: {}", url, e),
            }
        }
        out
    }
}
