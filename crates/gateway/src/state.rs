//! Shared application state for the gateway

use crate::websocket::hub::RealtimeHub;
use shopchat_chats::{ConversationService, MessageService};
use shopchat_config::RealtimeConfig;
use shopchat_database::UserRepository;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state containing the messaging services and the
/// realtime hub.
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Conversation store service
    pub conversation_service: Arc<ConversationService>,
    /// Message store service
    pub message_service: Arc<MessageService>,
    /// Read-only user directory lookup
    pub users: Arc<UserRepository>,
    /// Room-based broadcast hub
    pub hub: RealtimeHub,
}

impl GatewayState {
    /// Create a new gateway state with all services initialized
    pub fn new(pool: SqlitePool, realtime: &RealtimeConfig) -> Self {
        let storage_timeout = Duration::from_secs(realtime.storage_timeout_seconds);

        Self {
            conversation_service: Arc::new(ConversationService::new(
                pool.clone(),
                storage_timeout,
            )),
            message_service: Arc::new(MessageService::new(pool.clone(), storage_timeout)),
            users: Arc::new(UserRepository::new(pool.clone())),
            hub: RealtimeHub::new(realtime.outbound_queue_capacity),
            pool,
        }
    }
}
