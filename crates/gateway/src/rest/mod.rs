//! REST endpoints for the gateway

pub mod conversations;
pub mod health;
pub mod messages;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::state::GatewayState;

/// Create all REST routes
pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/chat/conversations",
            post(conversations::create_conversation),
        )
        .route(
            "/api/chat/conversations/:user_id",
            get(conversations::list_conversations),
        )
        .route(
            "/api/chat/:conversation_id/messages",
            get(messages::list_messages),
        )
        .route("/api/chat/messages", post(messages::create_message))
        .route("/api/chat/mark-read", post(messages::mark_read))
        .route(
            "/api/chat/members",
            post(conversations::add_member).delete(conversations::remove_member),
        )
}
