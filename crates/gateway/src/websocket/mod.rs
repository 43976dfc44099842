//! WebSocket endpoints for the gateway

pub mod events;
pub mod hub;
pub mod session;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::GatewayState;

/// Create all WebSocket routes
pub fn create_websocket_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/ws/chat", get(session::chat_websocket_handler))
}

pub use events::{ClientEvent, MessagePayload, SenderPayload, ServerEvent};
pub use hub::{ConnectionId, RealtimeHub};
