pub mod briefing;
pub mod render;
pub mod report;

pub use crate::domain::ports::{Delivery, MarketData, NewsSource, Notifier, ReportSink, Storage};
pub use crate::utils::error::Result;
