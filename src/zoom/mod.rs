//! Zoom REST API (v2): user enumeration and per-user recording listings.

pub mod error;
pub mod recordings;
pub mod responses;
pub mod session;
pub mod types;
pub mod users;

pub use error::ApiError;
pub use recordings::list_sessions;
pub use session::{ApiSession, Timeouts, ZoomSession, DEFAULT_API_BASE};
pub use types::{FileDescriptor, FileKind, Identity, RecordingSession};
pub use users::list_identities;

use crate::retry::RetryAction;

/// Largest page Zoom accepts on the listing endpoints.
pub const PAGE_SIZE: u32 = 300;

pub(crate) fn classify(e: &ApiError) -> RetryAction {
    if e.is_retryable() {
        RetryAction::Retry
    } else {
        RetryAction::Abort
    }
}
