//! Job notifications via SNS topics.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;
use tracing::debug;

use crate::error::{QueueError, QueueResult};

/// Publishes one-line messages to named event topics.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Publish `message` to `topic`, returning the provider's message ID.
    async fn publish(&self, topic: &str, message: &str) -> QueueResult<String>;
}

/// SNS-backed notifier.
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
}

impl SnsNotifier {
    /// Create a new notifier from a loaded AWS config.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl NotificationService for SnsNotifier {
    async fn publish(&self, topic: &str, message: &str) -> QueueResult<String> {
        debug!("Publishing {:?} to {}", message, topic);

        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .message(message)
            .send()
            .await
            .map_err(|e| QueueError::publish_failed(DisplayErrorContext(&e).to_string()))?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
