use clap::{Args, Parser, Subcommand};

use crate::types::*;

#[derive(Parser, Debug)]
#[command(
    name = "zoomdl-rs",
    version,
    about = "Download Zoom cloud recordings for every user on an account"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (RUST_LOG overrides this)
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download every recording not yet in the completion log
    Sync(SyncArgs),
    /// Show the completion log location and how many sessions it holds
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Zoom API bearer token.
    /// WARNING: passing via --token is visible in process listings.
    /// Prefer the ZOOM_API_TOKEN environment variable instead.
    #[arg(long, env = "ZOOM_API_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Local directory for downloads
    #[arg(short = 'd', long, default_value = "downloads")]
    pub directory: String,

    /// First day to list recordings for (ISO date, e.g. 2020-06-17)
    #[arg(long)]
    pub start_date: String,

    /// Last day to list recordings for (ISO date, default: today)
    #[arg(long)]
    pub end_date: Option<String>,

    /// File recording which sessions finished downloading
    #[arg(long, default_value = "completed-downloads.log")]
    pub completed_log: String,

    /// Zoom API base URL
    #[arg(long, default_value = crate::zoom::DEFAULT_API_BASE)]
    pub api_base: String,

    /// When a session counts as done
    #[arg(long, value_enum, default_value = "all-files")]
    pub completion_policy: CompletionPolicy,

    /// Max retries per request or file (0 = no retries)
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Initial retry delay in seconds
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// Request and read timeout in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub connect_timeout: u64,

    /// List what would be downloaded without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Completion log to inspect
    #[arg(long, default_value = "completed-downloads.log")]
    pub completed_log: String,
}
