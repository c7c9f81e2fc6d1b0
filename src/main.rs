use clap::Parser;
use finbrief::config::users::UserEntry;
use finbrief::utils::error::exit_on_error;
use finbrief::utils::{logger, validation::Validate};
use finbrief::{
    select_users, AppConfig, BriefingEngine, CliConfig, EnvMap, NotifySink, PublicQuotes,
    ReportGenerator, Result, RssClient, UsersFile,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("🚀 Starting finbrief sender");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        exit_on_error(&e);
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let config = AppConfig::from_file(&cli.config)?;
    config.validate()?;

    let users_file = UsersFile::load(&config.paths.users_file)?;
    let env = EnvMap::load(&config.paths.env_file);
    let users = select_users(&users_file, cli.user.as_deref(), UserEntry::single_sender())?;

    if cli.dry_run {
        tracing::info!("📝 Dry run: reports are rendered but nothing is sent");
    }

    let generator = ReportGenerator::new(PublicQuotes::new(&config.sources)?, RssClient::new()?);
    let sink = NotifySink::new(env, config.channels.clone(), cli.dry_run);
    let engine = BriefingEngine::new(generator, sink);

    let summary = engine.run(&users, &config.defaults).await?;
    println!("\n{}", summary.done_line());
    Ok(())
}
