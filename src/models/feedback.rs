use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single message on the wall.
///
/// Entries are created by the backend, which assigns `id` and `created_at`.
/// The client never invents either field and never mutates an entry once it
/// is in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: i64,
    pub name: String,
    pub message: String,
    /// ISO 8601 timestamp, kept exactly as the backend sent it.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl FeedbackEntry {
    /// Parse `created_at`, or `None` if the backend sent something that is not RFC 3339.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFeedbackInput {
    pub name: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_camel_case_timestamp_field() {
        let entry: FeedbackEntry = serde_json::from_str(
            r#"{"id":7,"name":"Ada","message":"Hello","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(entry.id, 7);
        assert_eq!(entry.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(
            entry.created_at_utc().unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn unparsable_timestamp_is_kept_verbatim() {
        let entry = FeedbackEntry {
            id: 1,
            name: "Ada".to_string(),
            message: "Hi".to_string(),
            created_at: "yesterday".to_string(),
        };

        assert!(entry.created_at_utc().is_none());
        assert_eq!(entry.created_at, "yesterday");
    }
}
