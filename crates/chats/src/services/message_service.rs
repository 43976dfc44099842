//! Message service: validated appends, ordered history and read-state
//! bookkeeping.

use crate::services::bounded;
use shopchat_database::{
    AppendMessageRequest, ChatError, ChatResult, ConversationRepository, Message,
    MessageRepository,
};
use sqlx::SqlitePool;
use std::time::Duration;

/// Service for message store operations.
pub struct MessageService {
    messages: MessageRepository,
    conversations: ConversationRepository,
    storage_timeout: Duration,
}

impl MessageService {
    /// Create a new message service instance
    pub fn new(pool: SqlitePool, storage_timeout: Duration) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            conversations: ConversationRepository::new(pool),
            storage_timeout,
        }
    }

    /// Append a message to a conversation.
    ///
    /// Content must trim non-empty and the sender must be a member; both are
    /// checked before any row is written. The store assigns the identifier and
    /// timestamp.
    pub async fn append(&self, request: &AppendMessageRequest) -> ChatResult<Message> {
        if request.validate().is_err() {
            return Err(ChatError::EmptyContent);
        }

        let is_member = bounded(
            self.storage_timeout,
            "is_member",
            self.conversations
                .is_member(&request.conversation_id, &request.sender_id),
        )
        .await?;

        if !is_member {
            return Err(ChatError::not_a_member(
                &request.conversation_id,
                &request.sender_id,
            ));
        }

        bounded(
            self.storage_timeout,
            "append_message",
            self.messages.insert(request),
        )
        .await
    }

    /// Full ordered history for a conversation.
    pub async fn list(&self, conversation_id: &str) -> ChatResult<Vec<Message>> {
        if self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .is_none()
        {
            return Err(ChatError::conversation_not_found(conversation_id));
        }

        bounded(
            self.storage_timeout,
            "list_messages",
            self.messages.list(conversation_id),
        )
        .await
    }

    /// Mark every message from other senders in the conversation as read.
    /// Returns the number of rows changed; 0 on repeat calls.
    pub async fn mark_read(&self, conversation_id: &str, reader_id: &str) -> ChatResult<u64> {
        if self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .is_none()
        {
            return Err(ChatError::conversation_not_found(conversation_id));
        }

        bounded(
            self.storage_timeout,
            "mark_read",
            self.messages.mark_read(conversation_id, reader_id),
        )
        .await
    }

    /// Derived unread count for a `(user, conversation)` pair.
    pub async fn unread_count(&self, conversation_id: &str, user_id: &str) -> ChatResult<i64> {
        bounded(
            self.storage_timeout,
            "unread_count",
            self.messages.unread_count(conversation_id, user_id),
        )
        .await
    }
}
