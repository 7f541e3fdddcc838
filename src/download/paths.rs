use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::zoom::{FileDescriptor, RecordingSession};

/// Longest single path component most filesystems accept, in bytes.
const MAX_COMPONENT_BYTES: usize = 255;

/// Device names Windows refuses as a file stem regardless of extension.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Where one recording file lands, relative to the download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    pub filename: String,
    pub folder: String,
}

impl DerivedName {
    pub fn local_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.folder).join(&self.filename)
    }
}

/// Build the sanitized `(filename, folder)` for one file of a session:
///
/// - filename: `<start> - <topic> - <Recording Type> - <file id>.<ext>`
/// - folder: `<topic> - <start>`
pub fn derive_name(session: &RecordingSession, file: &FileDescriptor) -> DerivedName {
    let start = format_start_time(&session.start_time);
    let topic = neutralize_topic(&session.topic);
    let rec_type = title_case(&file.recording_type().replace('_', " "));

    let tail = format!(
        " - {} - {}.{}",
        rec_type,
        file.id,
        file.file_extension.to_lowercase()
    );

    DerivedName {
        filename: join_within_limit(&format!("{} - {}", start, topic), &tail),
        folder: join_within_limit(&topic, &format!(" - {}", start)),
    }
}

/// Sanitize `head + tail` into one component, shortening only `head` when
/// the result would exceed the length limit. The tail carries the parts that
/// tell sibling files apart (file id, extension, start time).
fn join_within_limit(head: &str, tail: &str) -> String {
    let head: String = head.chars().filter(|c| !is_forbidden(*c)).collect();
    let tail: String = tail.chars().filter(|c| !is_forbidden(*c)).collect();
    // One spare byte for the `_` a reserved device-name stem receives.
    let budget = MAX_COMPONENT_BYTES.saturating_sub(tail.len() + 1);
    let head = truncate_utf8(head.trim_start(), budget);
    sanitize_component(&format!("{}{}", head, tail))
}

/// `2020.06.18 - 03.04 PM UTC`
pub fn format_start_time(start: &DateTime<Utc>) -> String {
    start.format("%Y.%m.%d - %I.%M %p UTC").to_string()
}

/// Replace path separators with `&` and commas with a space so a topic can
/// never introduce directory levels.
fn neutralize_topic(topic: &str) -> String {
    topic
        .chars()
        .map(|c| match c {
            '/' | '\\' => '&',
            ',' => ' ',
            other => other,
        })
        .collect()
}

/// Upper-case the first letter of every alphabetic run and lower-case the rest:
/// `"shared screen"` → `"Shared Screen"`, `"TIMELINE"` → `"Timeline"`.
fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            result.push(c);
            prev_alpha = false;
        }
    }
    result
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

fn is_reserved_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(stem))
}

/// Cut `s` to at most `max` bytes without splitting a character.
pub(crate) fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Windows silently drops trailing dots and spaces, so never produce them.
fn trim_component(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_whitespace() || c == '.')
}

/// Make `name` safe as a single path component on Windows, macOS and Linux.
///
/// Drops separators, reserved punctuation and control characters, trims
/// surrounding whitespace and trailing dots, caps the length at 255 bytes, and
/// suffixes `_` to reserved device names. Applying it twice gives the same
/// result as applying it once.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !is_forbidden(*c)).collect();
    let trimmed = trim_component(truncate_utf8(cleaned.trim(), MAX_COMPONENT_BYTES));
    if trimmed.is_empty() {
        return "_".to_string();
    }

    let mut out = trimmed.to_string();
    if is_reserved_name(&out) {
        let stem_end = out.find('.').unwrap_or(out.len());
        out.insert(stem_end, '_');
        if out.len() > MAX_COMPONENT_BYTES {
            out = trim_component(truncate_utf8(&out, MAX_COMPONENT_BYTES)).to_string();
        }
    }
    out
}
