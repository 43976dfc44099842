use serde::{Deserialize, Serialize};

/// A persisted chat message.
///
/// Messages are immutable once created; only the `is_read` flag changes, via
/// the conversation-wide mark-read bulk update. Ordering within a conversation
/// is total: `created_at`, then `message_id` as tiebreak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned monotonic identifier
    pub message_id: i64,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    /// Whether any recipient other than the sender has read this message
    pub is_read: bool,
    /// Server-assigned timestamp (RFC3339), authoritative for ordering
    pub created_at: String,
}

/// Request to append a message to a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendMessageRequest {
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
}

impl AppendMessageRequest {
    /// Content must remain non-empty after trimming whitespace.
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("message content cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_content_rejected() {
        let mut request = AppendMessageRequest {
            conversation_id: "CONu1u2".to_string(),
            sender_id: "u1".to_string(),
            content: String::new(),
        };
        assert!(request.validate().is_err());

        request.content = "   \t\n".to_string();
        assert!(request.validate().is_err());

        request.content = "hello".to_string();
        assert!(request.validate().is_ok());
    }
}
