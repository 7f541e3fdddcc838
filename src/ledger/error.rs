//! Error types for the completion ledger.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Reading or appending to the ledger file failed.
    #[error("Completion log I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The identifier can't be stored in a line-oriented log.
    #[error("Refusing to record session id that is empty, spans lines or has surrounding whitespace: {0:?}")]
    InvalidId(String),
}
