//! Job queue using SQS.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client;
use tracing::{debug, info};

use crate::error::{QueueError, QueueResult};
use crate::job::{QueueMessage, ReceiptHandle};

/// Largest batch a single receive may return.
pub const MAX_BATCH_SIZE: usize = 10;

/// Longest long-poll wait SQS accepts.
pub const MAX_WAIT_SECS: u64 = 20;

const DEFAULT_QUEUE_URL: &str = "https://sqs.us-east-1.amazonaws.com/776913033148/moments.fifo";

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue URL
    pub queue_url: String,
    /// Max jobs per fetch
    pub batch_size: usize,
    /// Long-poll wait per fetch
    pub wait_time: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            wait_time: Duration::from_secs(1),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            queue_url: std::env::var("MFE_QUEUE_URL")
                .unwrap_or_else(|_| DEFAULT_QUEUE_URL.to_string()),
            batch_size: std::env::var("MFE_QUEUE_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_BATCH_SIZE)
                .clamp(1, MAX_BATCH_SIZE),
            wait_time: Duration::from_secs(
                std::env::var("MFE_QUEUE_WAIT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1)
                    .min(MAX_WAIT_SECS),
            ),
        }
    }
}

/// Source of pending moment jobs.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Long-poll for up to `max_messages` messages, waiting at most `wait`.
    ///
    /// Bodies are returned undecoded so a bad message can still be removed.
    async fn fetch_batch(
        &self,
        max_messages: usize,
        wait: Duration,
    ) -> QueueResult<Vec<QueueMessage>>;

    /// Permanently remove a fully processed job.
    async fn delete_job(&self, handle: ReceiptHandle) -> QueueResult<()>;

    /// Eventually consistent count of messages still pending.
    async fn approximate_depth(&self) -> QueueResult<u64>;
}

/// SQS-backed job queue client.
#[derive(Clone)]
pub struct SqsQueueClient {
    client: Client,
    queue_url: String,
}

impl SqsQueueClient {
    /// Create a new queue client from a loaded AWS config.
    pub fn new(sdk_config: &SdkConfig, config: &QueueConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            queue_url: config.queue_url.clone(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn fetch_batch(
        &self,
        max_messages: usize,
        wait: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        let max_messages = max_messages.clamp(1, MAX_BATCH_SIZE) as i32;
        let wait_seconds = wait.as_secs().min(MAX_WAIT_SECS) as i32;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .map_err(|e| QueueError::receive_failed(DisplayErrorContext(&e).to_string()))?;

        let messages: Vec<QueueMessage> = output
            .messages()
            .iter()
            .map(|m| QueueMessage::new(m.message_id(), m.receipt_handle(), m.body()))
            .collect();

        debug!("Received {} messages from {}", messages.len(), self.queue_url);
        Ok(messages)
    }

    async fn delete_job(&self, handle: ReceiptHandle) -> QueueResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(handle.as_str())
            .send()
            .await
            .map_err(|e| QueueError::delete_failed(DisplayErrorContext(&e).to_string()))?;

        info!("Deleted job {}", handle);
        Ok(())
    }

    async fn approximate_depth(&self) -> QueueResult<u64> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| QueueError::attributes_failed(DisplayErrorContext(&e).to_string()))?;

        let raw = output
            .attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::ApproximateNumberOfMessages))
            .ok_or_else(|| {
                QueueError::attributes_failed("ApproximateNumberOfMessages missing from response")
            })?;

        parse_depth(raw)
    }
}

fn parse_depth(raw: &str) -> QueueResult<u64> {
    raw.trim().parse::<u64>().map_err(|e| {
        QueueError::attributes_failed(format!(
            "invalid ApproximateNumberOfMessages {:?}: {}",
            raw, e
        ))
    })
}
