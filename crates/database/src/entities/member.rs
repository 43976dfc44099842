use serde::{Deserialize, Serialize};

/// Durable record that a user belongs to a conversation.
///
/// Distinct from "joined a room", which is transient live-connection state in
/// the realtime hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub conversation_id: String,
    pub user_id: String,
    pub joined_at: String,
}
