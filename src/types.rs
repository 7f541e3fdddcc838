#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// When a session counts as fully synced and may be written to the ledger.
///
/// A session that still has a file processing upstream is never complete,
/// whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CompletionPolicy {
    /// Every available file downloaded, none failed.
    #[default]
    #[value(name = "all-files")]
    AllFiles,
    /// At least one file downloaded. Failed siblings are not retried later.
    #[value(name = "any-file")]
    AnyFile,
}
