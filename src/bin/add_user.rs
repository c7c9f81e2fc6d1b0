use clap::Parser;
use finbrief::config::enroll::{list_from_answer, list_from_args, EnvNames, Enrollment};
use finbrief::domain::model::Channel;
use finbrief::utils::error::exit_on_error;
use finbrief::utils::logger;
use finbrief::{AppConfig, Result};
use std::io::{self, BufRead, Write};

#[derive(Debug, Parser)]
#[command(name = "add_user")]
#[command(about = "Add or update a user in users.yaml and append secret placeholders to .env")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "finbrief.toml")]
    config: String,

    /// User id; omit to enter interactive mode
    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    name: Option<String>,

    /// serverchan, telegram or wecom
    #[arg(long)]
    channel: Option<String>,

    #[arg(long)]
    timezone: Option<String>,

    #[arg(long, num_args = 0..)]
    watchlist: Option<Vec<String>>,

    #[arg(long, num_args = 0..)]
    rss_feeds: Option<Vec<String>>,

    #[arg(long)]
    sendkey_env: Option<String>,

    #[arg(long)]
    bot_token_env: Option<String>,

    #[arg(long)]
    chat_id_env: Option<String>,

    #[arg(long)]
    webhook_env: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(args) {
        exit_on_error(&e);
    }
}

fn run(args: Args) -> Result<()> {
    let config = AppConfig::from_file(&args.config)?;

    let enrollment = match args.id.as_deref() {
        Some(_) => from_args(args)?,
        None => interactive()?,
    };

    let outcome = enrollment.apply(&config.paths.users_file, &config.paths.env_file)?;
    println!(
        "✅ 用户 '{}' 已写入 {}",
        enrollment.id.trim(),
        config.paths.users_file
    );
    if outcome.env_changed {
        println!(
            "✅ 已在 {} 追加环境变量占位：{}",
            config.paths.env_file,
            outcome.env_keys.join(", ")
        );
        println!("   请编辑该文件填入真实值。");
    } else {
        println!("ℹ️ 变量已存在于 {}，未修改。", config.paths.env_file);
    }
    Ok(())
}

fn from_args(args: Args) -> Result<Enrollment> {
    let channel = channel_or_exit(args.channel.as_deref());
    Ok(Enrollment {
        id: args.id.unwrap_or_default(),
        name: args.name,
        channel,
        timezone: args.timezone,
        watchlist: list_from_args(args.watchlist),
        rss_feeds: list_from_args(args.rss_feeds),
        env_names: EnvNames {
            sendkey: args.sendkey_env,
            bot_token: args.bot_token_env,
            chat_id: args.chat_id_env,
            webhook: args.webhook_env,
        },
    })
}

fn interactive() -> Result<Enrollment> {
    println!("== 交互模式（亦可用 --id/--channel 等参数免交互）==");
    let stdin = io::stdin();
    let mut lines = stdin.lock();

    let id = prompt(&mut lines, "用户ID（必填，例 eva）：")?;
    if id.is_empty() {
        eprintln!("错误：ID 不能为空");
        std::process::exit(1);
    }
    let name = prompt(&mut lines, &format!("显示名（默认 {}）：", id))?;
    let channel = prompt(&mut lines, "推送渠道 [serverchan/telegram/wecom]（默认 serverchan）：")?;
    let channel = channel_or_exit(Some(&channel));
    let timezone = prompt(&mut lines, "时区（默认继承全局，例 Asia/Shanghai）：")?;
    let watchlist = prompt(&mut lines, "自选股（空格/逗号分隔，例 sh600519 sz000858）：")?;
    let rss = prompt(&mut lines, "专属 RSS（留空则继承全局；多条空格/逗号分隔）：")?;

    Ok(Enrollment {
        id,
        name: Some(name),
        channel,
        timezone: Some(timezone),
        watchlist: list_from_answer(&watchlist),
        rss_feeds: list_from_answer(&rss),
        env_names: EnvNames::default(),
    })
}

fn channel_or_exit(raw: Option<&str>) -> Channel {
    match Enrollment::parse_channel(raw) {
        Ok(channel) => channel,
        Err(e) => {
            tracing::debug!("{}", e);
            eprintln!("错误：渠道无效");
            std::process::exit(1);
        }
    }
}

fn prompt(lines: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut buf = String::new();
    lines.read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}
