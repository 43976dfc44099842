//! Repository for message data access operations.

use crate::entities::{AppendMessageRequest, Message};
use crate::types::{ChatError, ChatResult};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository implementing the message store: append-only history plus the
/// read-state bulk update.
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a message, assigning its identifier and timestamp server-side.
    ///
    /// Membership authorization happens in the service layer before this is
    /// called; the repository only persists.
    pub async fn insert(&self, request: &AppendMessageRequest) -> ChatResult<Message> {
        let created_at = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, sender_id, content, is_read, created_at)
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(&request.conversation_id)
        .bind(&request.sender_id)
        .bind(&request.content)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id = message_id,
            conversation_id = %request.conversation_id,
            sender_id = %request.sender_id,
            "persisted new message"
        );

        Ok(Message {
            message_id,
            conversation_id: request.conversation_id.clone(),
            sender_id: request.sender_id.clone(),
            content: request.content.clone(),
            is_read: false,
            created_at,
        })
    }

    /// Return the full ordered history for a conversation.
    ///
    /// Ordering is the total order: `created_at` ascending, `message_id` as
    /// tiebreak.
    pub async fn list(&self, conversation_id: &str) -> ChatResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT message_id, conversation_id, sender_id, content, is_read, created_at
             FROM messages WHERE conversation_id = ?
             ORDER BY created_at ASC, message_id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(|row| map_message(&row)).collect()
    }

    /// Flip `is_read` on every unread message in the conversation not sent by
    /// the reader. Returns the number of rows changed; idempotent, so a second
    /// call in a row returns 0.
    pub async fn mark_read(&self, conversation_id: &str, reader_id: &str) -> ChatResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1
             WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let changed = result.rows_affected();
        if changed > 0 {
            info!(
                conversation_id = conversation_id,
                reader_id = reader_id,
                marked = changed,
                "marked conversation read"
            );
        }

        Ok(changed)
    }

    /// Derived unread count for a `(user, conversation)` pair: messages from
    /// other senders with `is_read = 0`.
    pub async fn unread_count(&self, conversation_id: &str, user_id: &str) -> ChatResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM messages
             WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.try_get("count")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))
    }
}

fn map_message(row: &sqlx::sqlite::SqliteRow) -> ChatResult<Message> {
    Ok(Message {
        message_id: row
            .try_get("message_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        conversation_id: row
            .try_get("conversation_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        sender_id: row
            .try_get("sender_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        content: row
            .try_get("content")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        is_read: row
            .try_get("is_read")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}
