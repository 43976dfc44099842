//! Domain entities for the messaging core.

pub mod conversation;
pub mod member;
pub mod message;
pub mod user;

pub use conversation::{Conversation, ConversationSummary, CreateConversationRequest};
pub use member::Membership;
pub use message::{AppendMessageRequest, Message};
pub use user::UserProfile;
