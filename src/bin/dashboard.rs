use clap::Parser;
use finbrief::domain::ports::{MarketData, NewsSource};
use finbrief::utils::error::exit_on_error;
use finbrief::utils::{logger, validation::Validate};
use finbrief::web::{app_router, db::Database, AppState};
use finbrief::{AppConfig, PublicQuotes, Result, RssClient};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "dashboard")]
#[command(about = "Serve the self-service dashboard that edits users.yaml")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "finbrief.toml")]
    config: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_server_logger(args.json_logs);

    if let Err(e) = run(args).await {
        exit_on_error(&e);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::from_file(&args.config)?;
    config.validate()?;

    let db = Database::open(&config.paths.database).await?;

    let market: Arc<dyn MarketData> = Arc::new(PublicQuotes::new(&config.sources)?);
    let news: Arc<dyn NewsSource> = Arc::new(RssClient::new()?);
    let state = AppState::new(db, config, market, news);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!("🌐 Dashboard listening on http://{}", args.bind);

    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
