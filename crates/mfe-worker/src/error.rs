//! Worker error types.

use thiserror::Error;

use mfe_metadata::MetadataError;
use mfe_queue::QueueError;
use mfe_storage::StorageError;
use mfe_youtube::PublishError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Metadata update rejected with status {status}: {body}")]
    MetadataRejected { status: u16, body: String },
}

/// Coarse failure classes used in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials or settings unusable
    Config,
    /// A remote service could not be reached or refused the request
    Transport,
    /// The hosting platform rejected the credentials
    Auth,
    /// The hosting platform rejected the video
    Upload,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Transport => "transport",
            ErrorKind::Auth => "auth",
            ErrorKind::Upload => "upload",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::Config(_) => ErrorKind::Config,
            WorkerError::Publish(PublishError::AuthFailed(_)) => ErrorKind::Auth,
            WorkerError::Publish(PublishError::UploadFailed(_)) => ErrorKind::Upload,
            WorkerError::Publish(PublishError::ClientSetup(_)) => ErrorKind::Config,
            WorkerError::Metadata(MetadataError::ClientSetup(_)) => ErrorKind::Config,
            WorkerError::Queue(_)
            | WorkerError::Storage(_)
            | WorkerError::Metadata(_)
            | WorkerError::MetadataRejected { .. } => ErrorKind::Transport,
        }
    }
}
