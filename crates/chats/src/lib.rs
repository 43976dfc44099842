//! # Shopchat Chats Crate
//!
//! Business logic for the messaging core: the conversation store and message
//! store service layers. Services validate requests, authorize against
//! membership, and bound every storage call with a deadline so one slow write
//! cannot stall a connection's read loop.
//!
//! Persistence lives in `shopchat-database`; live fan-out lives in the
//! gateway's realtime hub. This crate sits between: the gateway's session
//! adapter and REST handlers call these services.

pub mod services;

pub use services::{ConversationService, MessageService};

// Re-export the storage vocabulary so callers only need one import path.
pub use shopchat_database::{
    AppendMessageRequest, ChatError, ChatResult, Conversation, ConversationSummary,
    CreateConversationRequest, Membership, Message, UserProfile,
};
