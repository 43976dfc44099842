//! Read-only lookup into the externally-owned user directory.

use crate::entities::UserProfile;
use crate::types::{ChatError, ChatResult};
use sqlx::{Row, SqlitePool};

/// Repository for user identity lookups.
///
/// The auth system owns the `users` table; the messaging core only resolves
/// `user_id -> {username, email}` to stamp outgoing payloads.
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user profile by its identifier
    pub async fn find_by_id(&self, user_id: &str) -> ChatResult<Option<UserProfile>> {
        let row = sqlx::query("SELECT user_id, username, email FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| {
            Ok(UserProfile {
                user_id: row
                    .try_get("user_id")
                    .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                username: row
                    .try_get("username")
                    .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
                email: row
                    .try_get("email")
                    .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            })
        })
        .transpose()
    }

    /// Resolve a profile, failing when the identity is unknown.
    pub async fn require(&self, user_id: &str) -> ChatResult<UserProfile> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| ChatError::user_not_found(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::create_test_pool;

    #[tokio::test]
    async fn test_find_and_require() {
        let (pool, _temp_dir) = create_test_pool().await;

        sqlx::query("INSERT INTO users (user_id, username, email) VALUES (?, ?, ?)")
            .bind("u1")
            .bind("alice")
            .bind("alice@example.com")
            .execute(&pool)
            .await
            .unwrap();

        let repo = UserRepository::new(pool);

        let profile = repo.require("u1").await.unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email, "alice@example.com");

        assert!(repo.find_by_id("u2").await.unwrap().is_none());
        let err = repo.require("u2").await.unwrap_err();
        assert!(matches!(err, ChatError::UserNotFound { .. }));
    }
}
