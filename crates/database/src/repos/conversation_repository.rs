//! Repository for conversation and membership data access operations.

use crate::entities::{Conversation, ConversationSummary, CreateConversationRequest, Membership};
use crate::types::{ChatError, ChatResult};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository implementing the conversation store: conversations and their
/// durable membership records.
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    /// Create a new conversation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a conversation by its identifier
    pub async fn find_by_id(&self, conversation_id: &str) -> ChatResult<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT conversation_id, name, is_group, host_id, created_at
             FROM conversations WHERE conversation_id = ?",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| map_conversation(&row)).transpose()
    }

    /// Create a conversation together with one membership row per participant.
    ///
    /// The conversation insert and the membership inserts share a transaction;
    /// a duplicate identifier leaves the existing conversation untouched.
    pub async fn create(&self, request: &CreateConversationRequest) -> ChatResult<Conversation> {
        request
            .validate()
            .map_err(ChatError::invalid_membership)?;

        if self.find_by_id(&request.conversation_id).await?.is_some() {
            return Err(ChatError::duplicate_conversation(&request.conversation_id));
        }

        let conversation = Conversation::new(
            request.conversation_id.clone(),
            request.name.clone(),
            request.is_group,
            request.host_id.clone(),
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO conversations (conversation_id, name, is_group, host_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&conversation.conversation_id)
        .bind(&conversation.name)
        .bind(conversation.is_group)
        .bind(&conversation.host_id)
        .bind(&conversation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        for user_id in &request.participant_ids {
            sqlx::query(
                "INSERT INTO conversation_members (conversation_id, user_id, joined_at)
                 VALUES (?, ?, ?)",
            )
            .bind(&conversation.conversation_id)
            .bind(user_id)
            .bind(&conversation.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(
            conversation_id = %conversation.conversation_id,
            participants = request.participant_ids.len(),
            is_group = conversation.is_group,
            "created new conversation"
        );

        Ok(conversation)
    }

    /// Check whether a user holds a membership record for a conversation.
    ///
    /// Pure lookup, no side effects. An unknown conversation id is an error,
    /// distinct from "known conversation, not a member".
    pub async fn is_member(&self, conversation_id: &str, user_id: &str) -> ChatResult<bool> {
        if self.find_by_id(conversation_id).await?.is_none() {
            return Err(ChatError::conversation_not_found(conversation_id));
        }

        let row = sqlx::query(
            "SELECT 1 FROM conversation_members WHERE conversation_id = ? AND user_id = ?",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(row.is_some())
    }

    /// List all membership rows for a conversation
    pub async fn find_members(&self, conversation_id: &str) -> ChatResult<Vec<Membership>> {
        let rows = sqlx::query(
            "SELECT conversation_id, user_id, joined_at
             FROM conversation_members WHERE conversation_id = ? ORDER BY joined_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                Ok(Membership {
                    conversation_id: row
                        .try_get("conversation_id")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    user_id: row
                        .try_get("user_id")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    joined_at: row
                        .try_get("joined_at")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                })
            })
            .collect()
    }

    /// List the conversations a user belongs to, most-recent-activity first.
    ///
    /// Each summary carries the newest message preview and the derived unread
    /// count for this user. Conversations with no messages sort last, by their
    /// own creation timestamp.
    pub async fn list_for_user(&self, user_id: &str) -> ChatResult<Vec<ConversationSummary>> {
        let rows = sqlx::query(
            "SELECT c.conversation_id, c.name, c.is_group, c.host_id, c.created_at,
                    (SELECT m.content FROM messages m
                      WHERE m.conversation_id = c.conversation_id
                      ORDER BY m.created_at DESC, m.message_id DESC LIMIT 1) AS newest_message,
                    (SELECT COUNT(*) FROM messages m
                      WHERE m.conversation_id = c.conversation_id
                        AND m.sender_id != ? AND m.is_read = 0) AS unread_count,
                    (SELECT MAX(m.created_at) FROM messages m
                      WHERE m.conversation_id = c.conversation_id) AS last_activity
             FROM conversations c
             JOIN conversation_members cm ON cm.conversation_id = c.conversation_id
             WHERE cm.user_id = ?
             ORDER BY (last_activity IS NULL) ASC,
                      COALESCE(last_activity, c.created_at) DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                Ok(ConversationSummary {
                    conversation_id: row
                        .try_get("conversation_id")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    name: row
                        .try_get("name")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    is_group: row
                        .try_get("is_group")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    host_id: row
                        .try_get("host_id")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    created_at: row
                        .try_get("created_at")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    newest_message: row
                        .try_get("newest_message")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    unread_count: row
                        .try_get("unread_count")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                    last_activity: row
                        .try_get("last_activity")
                        .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                })
            })
            .collect()
    }

    /// Add a member to an existing group conversation.
    pub async fn add_member(&self, conversation_id: &str, user_id: &str) -> ChatResult<Membership> {
        let conversation = self
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ChatError::conversation_not_found(conversation_id))?;

        if !conversation.is_group {
            return Err(ChatError::invalid_membership(
                "members can only be added to group conversations",
            ));
        }

        if self.is_member(conversation_id, user_id).await? {
            return Err(ChatError::invalid_membership(format!(
                "user {} is already a member",
                user_id
            )));
        }

        let joined_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO conversation_members (conversation_id, user_id, joined_at)
             VALUES (?, ?, ?)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(&joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(
            conversation_id = conversation_id,
            user_id = user_id,
            "added member to group conversation"
        );

        Ok(Membership {
            conversation_id: conversation_id.to_string(),
            user_id: user_id.to_string(),
            joined_at,
        })
    }

    /// Remove a member from a conversation (leave support).
    pub async fn remove_member(&self, conversation_id: &str, user_id: &str) -> ChatResult<()> {
        if !self.is_member(conversation_id, user_id).await? {
            return Err(ChatError::not_a_member(conversation_id, user_id));
        }

        sqlx::query("DELETE FROM conversation_members WHERE conversation_id = ? AND user_id = ?")
            .bind(conversation_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(
            conversation_id = conversation_id,
            user_id = user_id,
            "removed member from conversation"
        );

        Ok(())
    }
}

fn map_conversation(row: &sqlx::sqlite::SqliteRow) -> ChatResult<Conversation> {
    Ok(Conversation {
        conversation_id: row
            .try_get("conversation_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        name: row
            .try_get("name")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        is_group: row
            .try_get("is_group")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        host_id: row
            .try_get("host_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::create_test_pool;

    fn direct_request(id: &str, participants: &[&str]) -> CreateConversationRequest {
        CreateConversationRequest {
            conversation_id: id.to_string(),
            name: "Support".to_string(),
            participant_ids: participants.iter().map(|s| s.to_string()).collect(),
            is_group: false,
            host_id: Some(participants[0].to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_conversation_with_memberships() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ConversationRepository::new(pool);

        let conversation = repo
            .create(&direct_request("CONu1u2", &["u1", "u2"]))
            .await
            .unwrap();
        assert_eq!(conversation.conversation_id, "CONu1u2");
        assert!(!conversation.is_group);

        let members = repo.find_members("CONu1u2").await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(repo.is_member("CONu1u2", "u1").await.unwrap());
        assert!(repo.is_member("CONu1u2", "u2").await.unwrap());
        assert!(!repo.is_member("CONu1u2", "u3").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_conversation_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ConversationRepository::new(pool);

        repo.create(&direct_request("CONu1u2", &["u1", "u2"]))
            .await
            .unwrap();

        let mut second = direct_request("CONu1u2", &["u3", "u4"]);
        second.name = "Imposter".to_string();
        let err = repo.create(&second).await.unwrap_err();
        assert!(matches!(err, ChatError::DuplicateConversation { .. }));

        // First conversation untouched.
        let existing = repo.find_by_id("CONu1u2").await.unwrap().unwrap();
        assert_eq!(existing.name, "Support");
        assert!(!repo.is_member("CONu1u2", "u3").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_membership_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ConversationRepository::new(pool);

        let err = repo
            .create(&direct_request("CONsolo", &["u1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidMembership { .. }));

        let mut empty = direct_request("CONempty", &["u1", "u2"]);
        empty.participant_ids.clear();
        empty.is_group = true;
        let err = repo.create(&empty).await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidMembership { .. }));
    }

    #[tokio::test]
    async fn test_is_member_on_unknown_conversation() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ConversationRepository::new(pool);

        let err = repo.is_member("CONmissing", "u1").await.unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_member_group_only() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ConversationRepository::new(pool);

        repo.create(&CreateConversationRequest {
            conversation_id: "GRP1".to_string(),
            name: "Staff".to_string(),
            participant_ids: vec!["u1".to_string(), "u2".to_string()],
            is_group: true,
            host_id: Some("u1".to_string()),
        })
        .await
        .unwrap();

        repo.add_member("GRP1", "u3").await.unwrap();
        assert!(repo.is_member("GRP1", "u3").await.unwrap());

        // Already a member.
        let err = repo.add_member("GRP1", "u3").await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidMembership { .. }));

        // Direct conversations do not grow.
        repo.create(&direct_request("CONu1u2", &["u1", "u2"]))
            .await
            .unwrap();
        let err = repo.add_member("CONu1u2", "u3").await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidMembership { .. }));
    }

    #[tokio::test]
    async fn test_remove_member() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ConversationRepository::new(pool);

        repo.create(&CreateConversationRequest {
            conversation_id: "GRP1".to_string(),
            name: "Staff".to_string(),
            participant_ids: vec!["u1".to_string(), "u2".to_string(), "u3".to_string()],
            is_group: true,
            host_id: None,
        })
        .await
        .unwrap();

        repo.remove_member("GRP1", "u3").await.unwrap();
        assert!(!repo.is_member("GRP1", "u3").await.unwrap());

        let err = repo.remove_member("GRP1", "u3").await.unwrap_err();
        assert!(matches!(err, ChatError::NotAMember { .. }));
    }
}
