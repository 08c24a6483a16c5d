//! SQS job queue and SNS job notifications.
//!
//! This crate provides:
//! - Batch long-polling of moment jobs from SQS
//! - Job deletion by receipt handle
//! - Approximate queue depth
//! - Completion/failure notifications via SNS topics

pub mod error;
pub mod job;
pub mod notify;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::{Job, QueueMessage, ReceiptHandle};
pub use notify::{NotificationService, SnsNotifier};
pub use queue::{QueueClient, QueueConfig, SqsQueueClient, MAX_BATCH_SIZE, MAX_WAIT_SECS};
