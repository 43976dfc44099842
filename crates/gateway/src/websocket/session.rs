//! Session adapter: binds a live WebSocket connection to a user identity and
//! orchestrates the authorize-then-join and persist-then-broadcast sequences.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use shopchat_database::{AppendMessageRequest, ChatError, UserProfile};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{chat_error_code, GatewayError};
use crate::state::GatewayState;
use crate::websocket::events::{ClientEvent, MessagePayload, ServerEvent};
use crate::websocket::hub::ConnectionId;

#[derive(Debug, Deserialize)]
pub struct WebSocketQuery {
    user_id: String,
}

/// Chat WebSocket connection handler.
///
/// Identity issuance is the external auth system's concern; this endpoint
/// binds the connection to the supplied `user_id` and rejects identifiers the
/// user directory does not know before completing the upgrade.
pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<WebSocketQuery>,
) -> Result<Response, GatewayError> {
    let profile = state.users.require(&query.user_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_chat_socket(socket, state, profile)))
}

/// Drive one connection: a spawned writer drains the hub's outbound queue
/// into the socket while this task runs the read loop.
async fn handle_chat_socket(socket: WebSocket, state: Arc<GatewayState>, profile: UserProfile) {
    let (mut sink, mut stream) = socket.split();
    let connection_id: ConnectionId = Uuid::new_v4();

    let mut outbound = state
        .hub
        .register(connection_id, profile.user_id.clone())
        .await;

    info!(%connection_id, user_id = %profile.user_id, "chat connection established");

    state
        .hub
        .send_to(
            connection_id,
            ServerEvent::Hello {
                user_id: profile.user_id.clone(),
                username: profile.username.clone(),
            },
        )
        .await;

    let write_task = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if sink.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(error) => warn!(?error, "failed to serialize outbound event"),
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => handle_client_event(event, &state, connection_id, &profile).await,
                Err(error) => {
                    debug!(%connection_id, ?error, "unparseable client event");
                    state
                        .hub
                        .send_to(
                            connection_id,
                            ServerEvent::Error {
                                code: "bad_request".to_string(),
                                message: "unrecognized event".to_string(),
                            },
                        )
                        .await;
                }
            },
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    // Teardown: drop the connection from every room. Remaining members keep
    // receiving broadcasts; only this client stops.
    state.hub.unregister(connection_id).await;
    let _ = write_task.await;

    info!(%connection_id, user_id = %profile.user_id, "chat connection closed");
}

async fn handle_client_event(
    event: ClientEvent,
    state: &Arc<GatewayState>,
    connection_id: ConnectionId,
    profile: &UserProfile,
) {
    match event {
        ClientEvent::Ping => {
            state.hub.send_to(connection_id, ServerEvent::Pong).await;
        }
        ClientEvent::JoinRoom { conversation_id } => {
            // Authorize before joining: the hub itself trusts its callers.
            match state
                .conversation_service
                .is_member(&conversation_id, &profile.user_id)
                .await
            {
                Ok(true) => {
                    state.hub.join_room(connection_id, &conversation_id).await;
                    state
                        .hub
                        .send_to(connection_id, ServerEvent::Joined { conversation_id })
                        .await;
                }
                Ok(false) => {
                    let err = ChatError::forbidden(format!(
                        "user {} is not a member of conversation {}",
                        profile.user_id, conversation_id
                    ));
                    send_error(state, connection_id, &err).await;
                }
                Err(err) => send_error(state, connection_id, &err).await,
            }
        }
        ClientEvent::LeaveRoom { conversation_id } => {
            state.hub.leave_room(connection_id, &conversation_id).await;
            state
                .hub
                .send_to(connection_id, ServerEvent::Left { conversation_id })
                .await;
        }
        ClientEvent::SendMessage {
            conversation_id,
            content,
            local_id,
        } => {
            let request = AppendMessageRequest {
                conversation_id: conversation_id.clone(),
                sender_id: profile.user_id.clone(),
                content,
            };

            // Persist first; a failed append produces no broadcast, only an
            // explicit error back to the sender.
            match state.message_service.append(&request).await {
                Ok(message) => {
                    let payload = MessagePayload::from_message(message, profile);

                    state
                        .hub
                        .broadcast(
                            &conversation_id,
                            &ServerEvent::Message {
                                conversation_id: conversation_id.clone(),
                                message: payload.clone(),
                            },
                            Some(connection_id),
                        )
                        .await;

                    state
                        .hub
                        .send_to(
                            connection_id,
                            ServerEvent::MessageAccepted {
                                local_id,
                                message: payload,
                            },
                        )
                        .await;
                }
                Err(err) => send_error(state, connection_id, &err).await,
            }
        }
        ClientEvent::OpenConversation { conversation_id } => {
            let marked = match state
                .message_service
                .mark_read(&conversation_id, &profile.user_id)
                .await
            {
                Ok(marked) => marked,
                Err(err) => {
                    send_error(state, connection_id, &err).await;
                    return;
                }
            };

            let unread = match state
                .message_service
                .unread_count(&conversation_id, &profile.user_id)
                .await
            {
                Ok(unread) => unread,
                Err(err) => {
                    send_error(state, connection_id, &err).await;
                    return;
                }
            };

            state
                .hub
                .send_to(
                    connection_id,
                    ServerEvent::ConversationRead {
                        conversation_id,
                        marked,
                        unread,
                    },
                )
                .await;
        }
    }
}

/// Surface a failure to the originating connection only. Validation errors
/// never tear the connection down and are never broadcast.
async fn send_error(state: &Arc<GatewayState>, connection_id: ConnectionId, err: &ChatError) {
    state
        .hub
        .send_to(
            connection_id,
            ServerEvent::Error {
                code: chat_error_code(err).to_string(),
                message: err.to_string(),
            },
        )
        .await;
}
