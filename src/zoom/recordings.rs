use super::error::ApiError;
use super::responses::RecordingsPage;
use super::session::ApiSession;
use super::types::{Identity, RecordingSession};
use super::{classify, PAGE_SIZE};
use crate::dates::{DateWindow, DateWindows};
use crate::retry::{self, RetryConfig};

const DATE_FORMAT: &str = "%Y-%m-%d";

async fn fetch_window(
    session: &dyn ApiSession,
    identity: &Identity,
    window: DateWindow,
    retry_config: &RetryConfig,
) -> Result<RecordingsPage, ApiError> {
    let path = format!("users/{}/recordings", identity.id);
    let query = [
        ("page_size", PAGE_SIZE.to_string()),
        ("from", window.start.format(DATE_FORMAT).to_string()),
        ("to", window.end.format(DATE_FORMAT).to_string()),
    ];
    let what = format!("Recording listing for {} ({})", identity.email, window);
    let value = retry::retry_with_backoff(retry_config, &what, classify, || {
        session.get_json(&path, &query)
    })
    .await?;
    Ok(serde_json::from_value(value)?)
}

/// List every recording session of `identity` across `windows`.
///
/// One request per window, results kept in window order then API order. A
/// session reported by two adjacent windows appears twice; the completion
/// ledger filters repeats downstream.
pub async fn list_sessions(
    session: &dyn ApiSession,
    identity: &Identity,
    windows: &DateWindows,
    retry_config: &RetryConfig,
) -> Result<Vec<RecordingSession>, ApiError> {
    let mut sessions = Vec::new();
    for window in windows {
        let page = fetch_window(session, identity, window, retry_config).await?;
        tracing::debug!(
            user = %identity.email,
            window = %window,
            days = window.days(),
            meetings = page.meetings.len(),
            "Fetched recordings window"
        );
        sessions.extend(page.meetings.into_iter().map(RecordingSession::from));
    }
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::zoom::session::fake::{param, FakeSession};

    fn alice() -> Identity {
        Identity {
            email: "alice@example.com".into(),
            id: "alice-id".into(),
            display_name: "Alice".into(),
        }
    }

    fn meeting(uuid: &str, start: &str) -> serde_json::Value {
        json!({
            "uuid": uuid,
            "topic": "Standup",
            "start_time": start,
            "recording_files": [{
                "id": format!("{uuid}-file"),
                "file_type": "MP4",
                "file_extension": "MP4",
                "download_url": format!("https://zoom.us/rec/download/{uuid}"),
                "recording_type": "active_speaker",
            }],
        })
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_one_request_per_window_in_order() {
        let session = FakeSession::new(|path, query| {
            assert_eq!(path, "users/alice-id/recordings");
            assert_eq!(param(query, "page_size"), Some("300"));
            let from = param(query, "from").unwrap().to_string();
            Ok(json!({"meetings": [
                meeting(&format!("{from}-a"), "2020-06-18T10:00:00Z"),
                meeting(&format!("{from}-b"), "2020-06-19T10:00:00Z"),
            ]}))
        });
        let windows = DateWindows::new(d(2020, 6, 17), d(2020, 8, 1), 30).unwrap();

        let sessions = list_sessions(&session, &alice(), &windows, &RetryConfig::no_retries())
            .await
            .unwrap();

        let uuids: Vec<_> = sessions.iter().map(|s| s.uuid.as_str()).collect();
        assert_eq!(
            uuids,
            vec!["2020-06-17-a", "2020-06-17-b", "2020-07-17-a", "2020-07-17-b"]
        );
        assert_eq!(
            session.calls(),
            vec![
                "users/alice-id/recordings?page_size=300&from=2020-06-17&to=2020-07-17",
                "users/alice-id/recordings?page_size=300&from=2020-07-17&to=2020-08-01",
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicates_across_windows_pass_through() {
        let session = FakeSession::new(|_, _| {
            Ok(json!({"meetings": [meeting("same", "2020-07-17T09:00:00Z")]}))
        });
        let windows = DateWindows::new(d(2020, 6, 17), d(2020, 8, 1), 30).unwrap();
        let sessions = list_sessions(&session, &alice(), &windows, &RetryConfig::no_retries())
            .await
            .unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0], sessions[1]);
    }

    #[tokio::test]
    async fn test_empty_range_makes_no_requests() {
        let session = FakeSession::new(|_, _| panic!("no request expected"));
        let day = d(2021, 1, 1);
        let windows = DateWindows::new(day, day, 30).unwrap();
        let sessions = list_sessions(&session, &alice(), &windows, &RetryConfig::no_retries())
            .await
            .unwrap();
        assert!(sessions.is_empty());
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_carry_descriptors() {
        let session = FakeSession::new(|_, _| {
            Ok(json!({"meetings": [meeting("m1", "2021-01-05T08:30:00Z")]}))
        });
        let windows = DateWindows::new(d(2021, 1, 1), d(2021, 1, 10), 30).unwrap();
        let sessions = list_sessions(&session, &alice(), &windows, &RetryConfig::no_retries())
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].files.len(), 1);
        assert_eq!(sessions[0].files[0].recording_type(), "active_speaker");
    }
}
