//! Error types for the messaging core.

use thiserror::Error;

/// Result type alias for chat storage and service operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Main error type for the messaging core.
///
/// Validation errors (`InvalidMembership`, `EmptyContent`, `NotAMember`) are
/// local and non-retryable; they are surfaced to the originating caller only
/// and never broadcast. `Timeout` is retryable.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Conversation already exists: {id}")]
    DuplicateConversation { id: String },

    #[error("Invalid membership: {reason}")]
    InvalidMembership { reason: String },

    #[error("User {user_id} is not a member of conversation {conversation_id}")]
    NotAMember {
        conversation_id: String,
        user_id: String,
    },

    #[error("Message content is empty")]
    EmptyContent,

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Storage operation timed out: {operation}")]
    Timeout { operation: &'static str },

    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: String },

    #[error("User not found: {id}")]
    UserNotFound { id: String },
}

impl ChatError {
    /// Create a duplicate conversation error
    pub fn duplicate_conversation(id: impl Into<String>) -> Self {
        Self::DuplicateConversation { id: id.into() }
    }

    /// Create an invalid membership error
    pub fn invalid_membership(reason: impl Into<String>) -> Self {
        Self::InvalidMembership {
            reason: reason.into(),
        }
    }

    /// Create a not-a-member error
    pub fn not_a_member(conversation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NotAMember {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a not found error for conversations
    pub fn conversation_not_found(id: impl Into<String>) -> Self {
        Self::ConversationNotFound { id: id.into() }
    }

    /// Create a not found error for users
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    /// Whether the caller may safely retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<chrono::ParseError> for ChatError {
    fn from(err: chrono::ParseError) -> Self {
        Self::DatabaseError(format!("date parsing error: {}", err))
    }
}
