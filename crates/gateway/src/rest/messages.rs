//! Message REST endpoints: history, appends and read-state reconciliation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shopchat_database::{AppendMessageRequest, Message};
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub conversation_id: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub conversation_id: String,
    /// Messages flipped to read by this call (0 when already reconciled)
    pub marked: u64,
    /// Unread count after the call
    pub unread: i64,
}

/// Full ordered message history for a conversation.
pub async fn list_messages(
    State(state): State<Arc<GatewayState>>,
    Path(conversation_id): Path<String>,
) -> GatewayResult<Json<Vec<Message>>> {
    let messages = state.message_service.list(&conversation_id).await?;
    Ok(Json(messages))
}

/// Append a message on behalf of a member.
pub async fn create_message(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<AppendMessageRequest>,
) -> GatewayResult<(StatusCode, Json<Message>)> {
    let message = state.message_service.append(&request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Mark a conversation read for a user and report the updated unread count.
pub async fn mark_read(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<MarkReadRequest>,
) -> GatewayResult<Json<MarkReadResponse>> {
    let marked = state
        .message_service
        .mark_read(&request.conversation_id, &request.user_id)
        .await?;
    let unread = state
        .message_service
        .unread_count(&request.conversation_id, &request.user_id)
        .await?;

    Ok(Json(MarkReadResponse {
        conversation_id: request.conversation_id,
        marked,
        unread,
    }))
}
