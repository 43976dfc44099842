//! # Shopchat Database Crate
//!
//! Storage layer for the shopchat messaging core: connection management,
//! migrations, and the repositories behind the conversation and message
//! stores, plus the read-only user directory lookup.

use shopchat_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{ConversationRepository, MessageRepository, UserRepository};

// Re-export entities
pub use entities::{
    AppendMessageRequest, Conversation, ConversationSummary, CreateConversationRequest,
    Membership, Message, UserProfile,
};

// Re-export types
pub use types::{ChatError, ChatResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> types::ChatResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

    Ok(pool)
}
