//! Publisher error types.

use thiserror::Error;

pub type PublishResult<T> = Result<T, PublishError>;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Client setup failed: {0}")]
    ClientSetup(String),
}

impl PublishError {
    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::AuthFailed(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    /// True if the token exchange failed.
    pub fn is_auth(&self) -> bool {
        matches!(self, PublishError::AuthFailed(_))
    }
}
