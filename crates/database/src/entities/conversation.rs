use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Represents a conversation between two or more users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Caller-supplied unique identifier (encodes creation context)
    pub conversation_id: String,
    /// Display name
    pub name: String,
    /// Whether this is a group conversation
    pub is_group: bool,
    /// Creator/owner reference, if any
    pub host_id: Option<String>,
    /// Creation timestamp (RFC3339)
    pub created_at: String,
}

impl Conversation {
    /// Create a new conversation instance with a server-assigned timestamp.
    pub fn new(
        conversation_id: String,
        name: String,
        is_group: bool,
        host_id: Option<String>,
    ) -> Self {
        Self {
            conversation_id,
            name,
            is_group,
            host_id,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Request to create a new conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub conversation_id: String,
    pub name: String,
    pub participant_ids: Vec<String>,
    pub is_group: bool,
    #[serde(default)]
    pub host_id: Option<String>,
}

impl CreateConversationRequest {
    /// Validate the membership rules: participants must be non-empty and
    /// distinct, and a direct conversation has exactly two participants.
    pub fn validate(&self) -> Result<(), String> {
        if self.conversation_id.trim().is_empty() {
            return Err("conversation_id cannot be empty".to_string());
        }

        if self.participant_ids.is_empty() {
            return Err("a conversation needs at least one participant".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for id in &self.participant_ids {
            if !seen.insert(id.as_str()) {
                return Err(format!("duplicate participant: {}", id));
            }
        }

        if !self.is_group && self.participant_ids.len() != 2 {
            return Err("a direct conversation has exactly two distinct participants".to_string());
        }

        Ok(())
    }
}

/// A conversation as listed for a user: carries the newest message preview and
/// the derived unread count for that user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub name: String,
    pub is_group: bool,
    pub host_id: Option<String>,
    pub created_at: String,
    /// Content of the newest message, if any
    pub newest_message: Option<String>,
    /// Messages from other senders not yet read by this user
    pub unread_count: i64,
    /// Timestamp of the newest message; `None` for empty conversations
    pub last_activity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(participants: &[&str], is_group: bool) -> CreateConversationRequest {
        CreateConversationRequest {
            conversation_id: "CONu1u2".to_string(),
            name: "Support".to_string(),
            participant_ids: participants.iter().map(|s| s.to_string()).collect(),
            is_group,
            host_id: None,
        }
    }

    #[test]
    fn test_direct_conversation_needs_two_participants() {
        assert!(request(&["u1", "u2"], false).validate().is_ok());
        assert!(request(&["u1"], false).validate().is_err());
        assert!(request(&["u1", "u2", "u3"], false).validate().is_err());
    }

    #[test]
    fn test_participants_must_be_distinct() {
        assert!(request(&["u1", "u1"], false).validate().is_err());
        assert!(request(&["u1", "u2", "u1"], true).validate().is_err());
    }

    #[test]
    fn test_group_allows_any_nonempty_membership() {
        assert!(request(&["u1"], true).validate().is_ok());
        assert!(request(&["u1", "u2", "u3"], true).validate().is_ok());
        assert!(request(&[], true).validate().is_err());
    }

    #[test]
    fn test_conversation_new_assigns_timestamp() {
        let conversation = Conversation::new(
            "CONu1u2".to_string(),
            "Support".to_string(),
            false,
            Some("u1".to_string()),
        );
        assert!(!conversation.created_at.is_empty());
        assert!(!conversation.is_group);
    }
}
