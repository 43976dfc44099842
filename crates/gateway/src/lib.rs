//! # Shopchat Gateway Crate
//!
//! HTTP and WebSocket surface for the messaging core. REST endpoints serve
//! the storefront's CRUD screens (conversation lists, history, mark-read);
//! the WebSocket endpoint carries the live chat channel, with the realtime
//! hub fanning broadcasts out to conversation rooms and the session adapter
//! binding each connection to a user identity.

pub mod error;
pub mod rest;
pub mod state;
pub mod websocket;

// Re-export main types for convenience
pub use error::{GatewayError, GatewayResult};
pub use state::GatewayState;
pub use websocket::{RealtimeHub, ServerEvent};

use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);

    Router::new()
        .merge(rest::create_rest_routes().with_state(arc_state.clone()))
        .merge(websocket::create_websocket_routes().with_state(arc_state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
