use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::cli::SyncArgs;
use crate::dates::{DateWindows, WINDOW_DAYS};
use crate::retry::RetryConfig;
use crate::sync::SyncConfig;
use crate::types::CompletionPolicy;
use crate::zoom::Timeouts;

/// Settings for one `sync` run, resolved from the command line.
pub struct Config {
    pub token: String,
    pub directory: PathBuf,
    pub completed_log: PathBuf,
    pub api_base: String,

    pub windows: DateWindows,

    pub retry_delay_secs: u64,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_retries: u32,

    pub completion_policy: CompletionPolicy,

    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("directory", &self.directory)
            .field("completed_log", &self.completed_log)
            .field("api_base", &self.api_base)
            .field("windows", &self.windows)
            .field("completion_policy", &self.completion_policy)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(args: SyncArgs) -> anyhow::Result<Self> {
        if args.token.trim().is_empty() {
            anyhow::bail!("The API token is empty; pass --token or set ZOOM_API_TOKEN");
        }

        let start = parse_date(&args.start_date)?;
        let end = match args.end_date.as_deref() {
            Some(s) => parse_date(s)?,
            None => Local::now().date_naive(),
        };
        if end <= start {
            anyhow::bail!(
                "--end-date ({}) must be after --start-date ({}); the range would list nothing",
                end,
                start
            );
        }
        let windows = DateWindows::new(start, end, WINDOW_DAYS)?;

        Ok(Self {
            token: args.token,
            directory: expand_tilde(&args.directory),
            completed_log: expand_tilde(&args.completed_log),
            api_base: args.api_base,
            windows,
            retry_delay_secs: args.retry_delay,
            timeout_secs: args.timeout,
            connect_timeout_secs: args.connect_timeout,
            max_retries: args.max_retries,
            completion_policy: args.completion_policy,
            dry_run: args.dry_run,
            no_progress_bar: args.no_progress_bar,
        })
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            base_delay_secs: self.retry_delay_secs,
            ..RetryConfig::default()
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            directory: self.directory.clone(),
            token: self.token.clone(),
            windows: self.windows,
            policy: self.completion_policy,
            retry: self.retry(),
            dry_run: self.dry_run,
        }
    }
}

/// Parse an ISO calendar date (`2020-06-17`).
pub(crate) fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        anyhow::anyhow!(
            "Cannot parse '{}' as a date. Expected ISO date (2020-06-17)",
            s
        )
    })
}
