//! Conversation service: creation, membership checks and per-user listings.

use crate::services::bounded;
use shopchat_database::{
    ChatResult, Conversation, ConversationRepository, ConversationSummary,
    CreateConversationRequest, Membership,
};
use sqlx::SqlitePool;
use std::time::Duration;

/// Service for conversation store operations.
pub struct ConversationService {
    conversations: ConversationRepository,
    storage_timeout: Duration,
}

impl ConversationService {
    /// Create a new conversation service instance
    pub fn new(pool: SqlitePool, storage_timeout: Duration) -> Self {
        Self {
            conversations: ConversationRepository::new(pool),
            storage_timeout,
        }
    }

    /// Create a conversation with its initial memberships.
    pub async fn create_conversation(
        &self,
        request: &CreateConversationRequest,
    ) -> ChatResult<Conversation> {
        bounded(
            self.storage_timeout,
            "create_conversation",
            self.conversations.create(request),
        )
        .await
    }

    /// List the conversations a user belongs to, most-recent-activity first,
    /// with newest-message previews and derived unread counts.
    pub async fn list_for_user(&self, user_id: &str) -> ChatResult<Vec<ConversationSummary>> {
        bounded(
            self.storage_timeout,
            "list_conversations",
            self.conversations.list_for_user(user_id),
        )
        .await
    }

    /// Check conversation membership. Used to authorize room joins and sends.
    pub async fn is_member(&self, conversation_id: &str, user_id: &str) -> ChatResult<bool> {
        bounded(
            self.storage_timeout,
            "is_member",
            self.conversations.is_member(conversation_id, user_id),
        )
        .await
    }

    /// Add a member to a group conversation.
    pub async fn add_member(&self, conversation_id: &str, user_id: &str) -> ChatResult<Membership> {
        bounded(
            self.storage_timeout,
            "add_member",
            self.conversations.add_member(conversation_id, user_id),
        )
        .await
    }

    /// Remove a member from a conversation.
    pub async fn remove_member(&self, conversation_id: &str, user_id: &str) -> ChatResult<()> {
        bounded(
            self.storage_timeout,
            "remove_member",
            self.conversations.remove_member(conversation_id, user_id),
        )
        .await
    }
}
