//! Conversation REST endpoints, consumed by the storefront's CRUD screens.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shopchat_database::{Conversation, ConversationSummary, CreateConversationRequest, Membership};
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::state::GatewayState;

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub name: String,
    pub is_group: bool,
    pub host_id: Option<String>,
    pub created_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            conversation_id: conversation.conversation_id,
            name: conversation.name,
            is_group: conversation.is_group,
            host_id: conversation.host_id,
            created_at: conversation.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub conversation_id: String,
    pub user_id: String,
}

/// Create a conversation with its initial participants.
pub async fn create_conversation(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<CreateConversationRequest>,
) -> GatewayResult<(StatusCode, Json<ConversationResponse>)> {
    let conversation = state.conversation_service.create_conversation(&request).await?;
    Ok((StatusCode::CREATED, Json(conversation.into())))
}

/// List the conversations a user belongs to, newest activity first, with
/// previews and unread counts.
pub async fn list_conversations(
    State(state): State<Arc<GatewayState>>,
    Path(user_id): Path<String>,
) -> GatewayResult<Json<Vec<ConversationSummary>>> {
    let summaries = state.conversation_service.list_for_user(&user_id).await?;
    Ok(Json(summaries))
}

/// Add a member to a group conversation.
pub async fn add_member(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<MemberRequest>,
) -> GatewayResult<(StatusCode, Json<Membership>)> {
    let membership = state
        .conversation_service
        .add_member(&request.conversation_id, &request.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// Remove a member from a conversation (leave).
pub async fn remove_member(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<MemberRequest>,
) -> GatewayResult<StatusCode> {
    state
        .conversation_service
        .remove_member(&request.conversation_id, &request.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
