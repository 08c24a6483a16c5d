//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Queue attributes unavailable: {0}")]
    AttributesFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Malformed message {message_id}: {reason}")]
    MalformedMessage { message_id: String, reason: String },
}

impl QueueError {
    pub fn receive_failed(msg: impl Into<String>) -> Self {
        Self::ReceiveFailed(msg.into())
    }

    pub fn delete_failed(msg: impl Into<String>) -> Self {
        Self::DeleteFailed(msg.into())
    }

    pub fn attributes_failed(msg: impl Into<String>) -> Self {
        Self::AttributesFailed(msg.into())
    }

    pub fn publish_failed(msg: impl Into<String>) -> Self {
        Self::PublishFailed(msg.into())
    }

    pub fn malformed(message_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message_id: message_id.into(),
            reason: reason.into(),
        }
    }
}
