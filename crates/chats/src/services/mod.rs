//! Business logic services over the storage repositories.

pub mod conversation_service;
pub mod message_service;

pub use conversation_service::ConversationService;
pub use message_service::MessageService;

use shopchat_database::{ChatError, ChatResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bound a storage call with a deadline.
///
/// An unbounded blocking write must not stall a connection's read loop, so
/// every service-level storage call goes through here. The resulting
/// `Timeout` is retryable by the caller.
pub(crate) async fn bounded<T, F>(
    timeout: Duration,
    operation: &'static str,
    fut: F,
) -> ChatResult<T>
where
    F: Future<Output = ChatResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = timeout.as_millis() as u64, "storage call exceeded deadline");
            Err(ChatError::Timeout { operation })
        }
    }
}
