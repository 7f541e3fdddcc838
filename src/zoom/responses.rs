//! Wire shapes of the Zoom v2 endpoints this tool reads.
//!
//! Only the fields the sync needs are modelled; everything defaults so that a
//! field Zoom omits for a given account type doesn't fail the whole page.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response from `GET /users`.
#[derive(Debug, Deserialize)]
pub struct UsersPage {
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UserEntry {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Response from `GET /users/{userId}/recordings`.
#[derive(Debug, Deserialize)]
pub struct RecordingsPage {
    #[serde(default)]
    pub meetings: Vec<MeetingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MeetingEntry {
    pub uuid: String,
    #[serde(default)]
    pub topic: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub recording_files: Vec<RecordingFileEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RecordingFileEntry {
    /// Absent while the file is still processing.
    #[serde(default)]
    pub id: String,
    /// Empty while the file is still processing.
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_extension: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub recording_type: Option<String>,
}
