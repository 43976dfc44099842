//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shopchat_database::ChatError;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Chat(err) => match err {
                ChatError::DuplicateConversation { .. } => StatusCode::CONFLICT,
                ChatError::InvalidMembership { .. } | ChatError::EmptyContent => {
                    StatusCode::BAD_REQUEST
                }
                ChatError::NotAMember { .. } | ChatError::Forbidden { .. } => {
                    StatusCode::FORBIDDEN
                }
                ChatError::ConversationNotFound { .. } | ChatError::UserNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                ChatError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                ChatError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code, shared with the websocket error events.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Chat(err) => chat_error_code(err),
            GatewayError::InvalidRequest(_) => "bad_request",
            GatewayError::InternalError(_) => "internal",
        }
    }
}

/// Machine-readable code for a chat error.
pub fn chat_error_code(err: &ChatError) -> &'static str {
    match err {
        ChatError::DuplicateConversation { .. } => "duplicate_conversation",
        ChatError::InvalidMembership { .. } => "invalid_membership",
        ChatError::NotAMember { .. } => "not_a_member",
        ChatError::EmptyContent => "empty_content",
        ChatError::Forbidden { .. } => "forbidden",
        ChatError::Timeout { .. } => "timeout",
        ChatError::ConversationNotFound { .. } | ChatError::UserNotFound { .. } => "not_found",
        ChatError::DatabaseError(_) => "internal",
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": self.code(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ChatError, StatusCode)> = vec![
            (
                ChatError::duplicate_conversation("C1"),
                StatusCode::CONFLICT,
            ),
            (ChatError::EmptyContent, StatusCode::BAD_REQUEST),
            (
                ChatError::invalid_membership("empty"),
                StatusCode::BAD_REQUEST,
            ),
            (ChatError::not_a_member("C1", "u9"), StatusCode::FORBIDDEN),
            (
                ChatError::conversation_not_found("C9"),
                StatusCode::NOT_FOUND,
            ),
            (
                ChatError::Timeout {
                    operation: "append_message",
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(GatewayError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(chat_error_code(&ChatError::EmptyContent), "empty_content");
        assert_eq!(
            chat_error_code(&ChatError::not_a_member("C1", "u9")),
            "not_a_member"
        );
        assert_eq!(
            chat_error_code(&ChatError::Timeout { operation: "x" }),
            "timeout"
        );
    }
}
