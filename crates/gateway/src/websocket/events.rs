//! Wire events for the chat WebSocket channel.

use serde::{Deserialize, Serialize};
use shopchat_database::{Message, UserProfile};

/// Client events received from WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Heartbeat to keep connection alive
    Ping,
    /// Join a conversation's broadcast room
    JoinRoom { conversation_id: String },
    /// Leave a conversation's broadcast room
    LeaveRoom { conversation_id: String },
    /// Send a message. `local_id` is the client's provisional identifier for
    /// its optimistic echo; it is round-tripped in the acceptance ack so the
    /// client can reconcile the placeholder with the authoritative message.
    SendMessage {
        conversation_id: String,
        content: String,
        #[serde(default)]
        local_id: Option<String>,
    },
    /// The user opened the conversation panel: mark history read
    OpenConversation { conversation_id: String },
}

/// Server events sent to WebSocket clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Welcome message after successful connection
    Hello { user_id: String, username: String },
    /// Heartbeat response
    Pong,
    /// Room join confirmation
    Joined { conversation_id: String },
    /// Room leave confirmation
    Left { conversation_id: String },
    /// New message broadcast to the other room members
    Message {
        conversation_id: String,
        message: MessagePayload,
    },
    /// Sender-only ack carrying the authoritative message for reconciliation
    MessageAccepted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        local_id: Option<String>,
        message: MessagePayload,
    },
    /// Result of opening a conversation: rows marked and the updated unread count
    ConversationRead {
        conversation_id: String,
        marked: u64,
        unread: i64,
    },
    /// Error response, scoped to the originating request
    Error { code: String, message: String },
}

/// Message shape on the wire: the persisted row plus the resolved sender
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub message_id: i64,
    pub conversation_id: String,
    pub content: String,
    pub created_at: String,
    pub is_read: bool,
    pub sender: SenderPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderPayload {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

impl MessagePayload {
    /// Combine a persisted message with its sender's profile.
    pub fn from_message(message: Message, sender: &UserProfile) -> Self {
        Self {
            message_id: message.message_id,
            conversation_id: message.conversation_id,
            content: message.content,
            created_at: message.created_at,
            is_read: message.is_read,
            sender: SenderPayload {
                user_id: sender.user_id.clone(),
                username: sender.username.clone(),
                email: sender.email.clone(),
            },
        }
    }
}
