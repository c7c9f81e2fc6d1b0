pub mod cli;
pub mod enroll;
pub mod env;
pub mod toml_config;
pub mod users;

use std::path::Path;

#[cfg(feature = "cli")]
use clap::Parser;

/// 推送入口的命令列參數
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "finbrief")]
#[command(about = "Render the daily finance briefing and push it to every configured user")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "finbrief.toml")]
    pub config: String,

    /// Only send to this user id (from users.yaml)
    #[arg(long)]
    pub user: Option<String>,

    /// Render and log the reports without sending anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// 把含密鑰的檔案權限收緊為 600；失敗只記錄不中斷
pub(crate) fn restrict_to_owner(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
            tracing::debug!("chmod 600 {} failed: {}", path.display(), e);
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
