pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "dashboard")]
pub mod web;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{market::PublicQuotes, notify::NotifySink, preview::PreviewSink, rss::RssClient};
pub use config::{cli::LocalStorage, env::EnvMap, toml_config::AppConfig, users::UsersFile};
pub use core::{
    briefing::{select_users, BriefingEngine, BriefingSummary},
    report::ReportGenerator,
};
pub use utils::error::{BriefError, Result};
