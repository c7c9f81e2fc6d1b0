use crate::config::toml_config::AppConfig;
use crate::core::report::ReportGenerator;
use crate::domain::ports::{MarketData, NewsSource};
use crate::web::db::Database;
use crate::web::session::SessionStore;
use std::sync::Arc;

pub type SharedGenerator = ReportGenerator<Arc<dyn MarketData>, Arc<dyn NewsSource>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
    pub generator: Arc<SharedGenerator>,
}

impl AppState {
    pub fn new(
        db: Database,
        config: AppConfig,
        market: Arc<dyn MarketData>,
        news: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
            config: Arc::new(config),
            generator: Arc::new(ReportGenerator::new(market, news)),
        }
    }

    pub fn users_file(&self) -> &str {
        &self.config.paths.users_file
    }
}
