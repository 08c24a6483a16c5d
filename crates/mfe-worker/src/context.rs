//! Startup wiring: the immutable context shared by the drain loop and the
//! job pipeline.

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use mfe_metadata::{MetadataClient, MetadataConfig, MetadataService};
use mfe_queue::{NotificationService, QueueClient, SnsNotifier, SqsQueueClient};
use mfe_storage::{BlobStore, S3BlobStore};
use mfe_youtube::{VideoPublisher, YoutubePublisher};

use crate::config::WorkerConfig;
use crate::credentials::Credentials;
use crate::error::WorkerResult;

/// External service clients.
#[derive(Clone)]
pub struct Services {
    pub queue: Arc<dyn QueueClient>,
    pub storage: Arc<dyn BlobStore>,
    pub publisher: Arc<dyn VideoPublisher>,
    pub metadata: Arc<dyn MetadataService>,
    pub notifier: Arc<dyn NotificationService>,
}

impl Services {
    /// Build production clients from a loaded AWS config.
    pub fn connect(
        sdk_config: &SdkConfig,
        config: &WorkerConfig,
        credentials: &Credentials,
    ) -> WorkerResult<Self> {
        let publisher = YoutubePublisher::new(config.youtube.clone())?;
        let metadata =
            MetadataClient::new(MetadataConfig::from_env(credentials.mfe.api_key.clone()))?;

        Ok(Self {
            queue: Arc::new(SqsQueueClient::new(sdk_config, &config.queue)),
            storage: Arc::new(S3BlobStore::new(sdk_config, &config.storage)),
            publisher: Arc::new(publisher),
            metadata: Arc::new(metadata),
            notifier: Arc::new(SnsNotifier::new(sdk_config)),
        })
    }
}

/// Everything a run needs, constructed once at startup.
pub struct WorkerContext {
    pub config: WorkerConfig,
    pub credentials: Credentials,
    pub services: Services,
}

impl WorkerContext {
    pub fn new(config: WorkerConfig, credentials: Credentials, services: Services) -> Self {
        Self {
            config,
            credentials,
            services,
        }
    }
}

/// Load the shared AWS configuration for the configured region.
pub async fn load_aws_config(region: &str) -> SdkConfig {
    info!("Loading AWS configuration for region {}", region);
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
