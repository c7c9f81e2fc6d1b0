// Adapters layer: concrete implementations for external systems (quote APIs, RSS, push channels, files)

pub mod market;
pub mod notify;
pub mod preview;
pub mod rss;
