use chrono::{DateTime, Utc};

use super::responses::{MeetingEntry, RecordingFileEntry, UserEntry};

/// A user on the account whose recordings are synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub id: String,
    pub display_name: String,
}

impl From<UserEntry> for Identity {
    fn from(user: UserEntry) -> Self {
        let display_name = format!("{} {}", user.first_name, user.last_name)
            .trim()
            .to_string();
        Self {
            email: user.email,
            id: user.id,
            display_name,
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.display_name.is_empty() {
            write!(f, "{}", self.email)
        } else {
            write!(f, "{} ({})", self.display_name, self.email)
        }
    }
}

/// What a recording file holds, derived from its `file_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// Upstream hasn't finished processing the file; nothing to download yet.
    Incomplete,
    Timeline,
    /// A media file, tagged with Zoom's `recording_type`
    /// (e.g. `shared_screen_with_speaker_view`, `audio_only`).
    Recording(String),
}

/// One downloadable artifact of a recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub id: String,
    pub kind: FileKind,
    pub file_extension: String,
    pub download_url: String,
}

impl FileDescriptor {
    pub fn is_incomplete(&self) -> bool {
        self.kind == FileKind::Incomplete
    }

    /// The type label used in filenames and log lines.
    pub fn recording_type(&self) -> &str {
        match &self.kind {
            FileKind::Incomplete => "incomplete",
            FileKind::Timeline => "TIMELINE",
            FileKind::Recording(t) => t,
        }
    }
}

impl From<RecordingFileEntry> for FileDescriptor {
    fn from(entry: RecordingFileEntry) -> Self {
        let kind = match entry.file_type.as_str() {
            "" => FileKind::Incomplete,
            "TIMELINE" => FileKind::Timeline,
            other => FileKind::Recording(
                entry
                    .recording_type
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| other.to_string()),
            ),
        };
        Self {
            id: entry.id,
            kind,
            file_extension: entry.file_extension,
            download_url: entry.download_url,
        }
    }
}

/// One recorded meeting instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
    pub uuid: String,
    pub topic: String,
    pub start_time: DateTime<Utc>,
    pub files: Vec<FileDescriptor>,
}

impl RecordingSession {
    pub fn has_incomplete_files(&self) -> bool {
        self.files.iter().any(FileDescriptor::is_incomplete)
    }
}

impl From<MeetingEntry> for RecordingSession {
    fn from(meeting: MeetingEntry) -> Self {
        Self {
            uuid: meeting.uuid,
            topic: meeting.topic,
            start_time: meeting.start_time,
            files: meeting
                .recording_files
                .into_iter()
                .map(FileDescriptor::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file_type: &str, recording_type: Option<&str>) -> RecordingFileEntry {
        RecordingFileEntry {
            id: "f1".into(),
            file_type: file_type.into(),
            file_extension: "MP4".into(),
            download_url: "https://zoom.us/rec/download/f1".into(),
            recording_type: recording_type.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_file_type_is_incomplete() {
        let fd = FileDescriptor::from(entry("", None));
        assert!(fd.is_incomplete());
        assert_eq!(fd.recording_type(), "incomplete");
    }

    #[test]
    fn test_timeline_kind() {
        let fd = FileDescriptor::from(entry("TIMELINE", Some("timeline")));
        assert_eq!(fd.kind, FileKind::Timeline);
        assert_eq!(fd.recording_type(), "TIMELINE");
    }

    #[test]
    fn test_recording_kind_uses_recording_type() {
        let fd = FileDescriptor::from(entry("MP4", Some("active_speaker")));
        assert_eq!(fd.recording_type(), "active_speaker");
    }

    #[test]
    fn test_recording_kind_falls_back_to_file_type() {
        let fd = FileDescriptor::from(entry("CHAT", None));
        assert_eq!(fd.kind, FileKind::Recording("CHAT".into()));
    }

    #[test]
    fn test_identity_display_name() {
        let id = Identity::from(UserEntry {
            id: "u1".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: String::new(),
        });
        assert_eq!(id.display_name, "Alice");
        assert_eq!(id.to_string(), "Alice (alice@example.com)");
    }
}
