use clap::Parser;
use finbrief::config::users::UserEntry;
use finbrief::utils::error::exit_on_error;
use finbrief::utils::{logger, validation::Validate};
use finbrief::{
    select_users, AppConfig, BriefingEngine, PreviewSink, PublicQuotes, ReportGenerator, Result,
    RssClient, UsersFile,
};

#[derive(Debug, Parser)]
#[command(name = "preview")]
#[command(about = "Render the briefing for each user and save it locally without sending")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "finbrief.toml")]
    config: String,

    /// Only preview this user id (from users.yaml)
    #[arg(long)]
    user: Option<String>,

    /// Output directory (defaults to paths.out_dir)
    #[arg(long)]
    out_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("🔍 Starting finbrief preview (nothing will be sent)");

    if let Err(e) = run(args).await {
        exit_on_error(&e);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::from_file(&args.config)?;
    config.validate()?;

    let users_file = UsersFile::load(&config.paths.users_file)?;
    let users = select_users(&users_file, args.user.as_deref(), UserEntry::single_preview())?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.paths.out_dir.clone());

    let generator = ReportGenerator::new(PublicQuotes::new(&config.sources)?, RssClient::new()?);
    let engine = BriefingEngine::new(generator, PreviewSink::new(out_dir));

    let summary = engine.run(&users, &config.defaults).await?;
    tracing::info!("✅ Saved {} preview file(s)", summary.saved.len());
    Ok(())
}
