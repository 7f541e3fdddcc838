//! Completion ledger: the durable set of recording sessions that finished
//! downloading, used to skip them on later runs.
//!
//! The ledger is append-only. An id is written only after every file of its
//! session is on disk, and the write is synced before `record` returns, so a
//! crash can at worst cause one session to be downloaded again.

pub mod error;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

pub use error::LedgerError;

/// Storage for completed session ids.
///
/// Object-safe so the driver can take `&dyn Ledger` and tests can swap in
/// [`MemoryLedger`].
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Every id recorded so far. A ledger that was never written is empty.
    async fn load(&self) -> Result<HashSet<String>, LedgerError>;

    /// Durably append `id`.
    async fn record(&self, id: &str) -> Result<(), LedgerError>;
}

/// `load` reads one trimmed, non-empty line per id, so only ids that survive
/// that unchanged can be recorded.
fn validate_id(id: &str) -> Result<(), LedgerError> {
    if id.is_empty() || id.contains(['\n', '\r']) || id.trim() != id {
        return Err(LedgerError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Line-oriented UTF-8 file, one session id per line.
#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl Ledger for FileLedger {
    async fn load(&self) -> Result<HashSet<String>, LedgerError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No completion log at {}, a new one will be created",
                    self.path.display()
                );
                return Ok(HashSet::new());
            }
            Err(e) => return Err(self.io_err(e)),
        };

        let ids: HashSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        tracing::debug!(
            count = ids.len(),
            path = %self.path.display(),
            "Loaded completion log"
        );
        Ok(ids)
    }

    async fn record(&self, id: &str) -> Result<(), LedgerError> {
        validate_id(id)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_err(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_err(e))?;

        let mut line = String::with_capacity(id.len() + 1);
        line.push_str(id);
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_err(e))?;
        file.flush().await.map_err(|e| self.io_err(e))?;
        file.sync_all().await.map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

/// In-memory ledger for tests and dry runs. Nothing survives the process.
///
/// A dry run seeds it from the real log so already-synced sessions are still
/// skipped while the file itself is never opened for writing.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<String>>,
}

impl MemoryLedger {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with ids that count as already completed.
    pub fn with_entries<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Recorded ids in append order.
    #[cfg(test)]
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // A poisoned lock only means a test panicked mid-push; the Vec is intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn load(&self) -> Result<HashSet<String>, LedgerError> {
        Ok(self.lock().iter().cloned().collect())
    }

    async fn record(&self, id: &str) -> Result<(), LedgerError> {
        validate_id(id)?;
        self.lock().push(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("completed-downloads.log"));
        assert!(ledger.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_then_fresh_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completed-downloads.log");

        FileLedger::new(&path).record("abc==").await.unwrap();
        FileLedger::new(&path).record("def/ghi==").await.unwrap();

        // A brand new instance stands in for a new process.
        let ids = FileLedger::new(&path).load().await.unwrap();
        assert!(ids.contains("abc=="));
        assert!(ids.contains("def/ghi=="));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "abc==\ndef/ghi==\n"
        );
    }

    #[tokio::test]
    async fn test_record_appends_without_rewriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        std::fs::write(&path, "existing\n").unwrap();

        FileLedger::new(&path).record("new").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\nnew\n");
    }

    #[tokio::test]
    async fn test_load_ignores_blank_lines_and_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        std::fs::write(&path, "one\r\n\n  two  \n\n").unwrap();

        let ids = FileLedger::new(&path).load().await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("one"));
        assert!(ids.contains("two"));
    }

    #[tokio::test]
    async fn test_record_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("nested").join("log");
        FileLedger::new(&path).record("x").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_rejects_multiline_id() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("log"));
        let err = ledger.record("a\nb").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidId(_)));
        assert!(ledger.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_ids_that_would_not_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::new(dir.path().join("log"));
        for id in [" padded", "padded ", "\tpadded", ""] {
            let err = ledger.record(id).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidId(_)), "accepted {id:?}");
        }
        assert!(!dir.path().join("log").exists());

        let memory = MemoryLedger::new();
        assert!(memory.record(" padded").await.is_err());
        assert!(memory.entries().is_empty());
    }

    #[tokio::test]
    async fn test_memory_ledger_records_in_order() {
        let ledger = MemoryLedger::with_entries(["seed"]);
        ledger.record("a").await.unwrap();
        ledger.record("b").await.unwrap();
        assert_eq!(ledger.entries(), vec!["seed", "a", "b"]);
        assert_eq!(ledger.load().await.unwrap().len(), 3);
    }
}
