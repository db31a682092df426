//! Chat log domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cartwise_core::{ChatRecordId, Email, UserId};

/// Number of characters shown in request previews.
pub const PREVIEW_CHARS: usize = 50;

/// One persisted chatbot exchange.
///
/// Records are append-only; nothing updates them after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRecord {
    /// Unique record ID.
    pub id: ChatRecordId,
    /// Shopper who sent the message, `None` only for rows created out of band.
    pub user_id: Option<UserId>,
    /// Trimmed, non-empty request text.
    pub request_text: String,
    /// Assistant reply (or the fallback reply).
    pub response_text: String,
    /// Insert time, set by the store.
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    /// Short preview of the request for listings.
    #[must_use]
    pub fn request_preview(&self) -> String {
        preview(&self.request_text, PREVIEW_CHARS)
    }
}

/// A chat record joined with its owner's email, for operator listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecordListing {
    /// The record itself.
    pub record: ChatRecord,
    /// Owner's email, if the record has an owner.
    pub user_email: Option<Email>,
}

/// Operator filter over the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecordFilter {
    /// Only records owned by this email.
    pub user_email: Option<Email>,
    /// Case-insensitive substring of request, response, or owner email.
    pub search: Option<String>,
    /// Maximum rows returned.
    pub limit: u32,
}

impl Default for ChatRecordFilter {
    fn default() -> Self {
        Self {
            user_email: None,
            search: None,
            limit: 100,
        }
    }
}

/// Truncate `text` to `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", text.get(..byte_idx).unwrap_or(text)),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("Where is my order?", 50), "Where is my order?");

        let exact = "x".repeat(50);
        assert_eq!(preview(&exact, 50), exact);
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "a".repeat(51);
        assert_eq!(preview(&long, 50), format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let emoji = "🛒".repeat(60);
        let shown = preview(&emoji, 50);
        assert_eq!(shown.chars().count(), 53);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_chat_record_serialization() {
        let record = ChatRecord {
            id: ChatRecordId::new(3),
            user_id: Some(UserId::new(1)),
            request_text: "Hello".to_string(),
            response_text: "Hi! How can I help?".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["id"], 3);
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["request_text"], "Hello");
        assert_eq!(record.request_preview(), "Hello");
    }
}
