//! Connectivity check for a deployed worker.
//!
//! Verifies credentials, both buckets, the queue and one token exchange
//! without consuming any jobs.

use anyhow::Context;

use mfe_queue::{QueueClient, SqsQueueClient};
use mfe_storage::S3BlobStore;
use mfe_worker::context::load_aws_config;
use mfe_worker::{Credentials, WorkerConfig};
use mfe_youtube::{VideoPublisher, YoutubePublisher};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env();
    println!(
        "worker-selfcheck: starting with credentials={}",
        config.credentials_path.display()
    );

    let credentials = Credentials::load(&config.credentials_path)?;
    let sdk_config = load_aws_config(&config.aws_region).await;

    ensure_buckets(&sdk_config, &config).await?;
    ensure_queue(&sdk_config, &config).await?;
    ensure_token_exchange(&config, &credentials).await?;

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_buckets(
    sdk_config: &aws_config::SdkConfig,
    config: &WorkerConfig,
) -> anyhow::Result<()> {
    let store = S3BlobStore::new(sdk_config, &config.storage);
    for bucket in [&config.upload_bucket, &config.archive_bucket] {
        store
            .check_bucket(bucket)
            .await
            .with_context(|| format!("bucket {} not reachable", bucket))?;
    }
    Ok(())
}

async fn ensure_queue(sdk_config: &aws_config::SdkConfig, config: &WorkerConfig) -> anyhow::Result<()> {
    let queue = SqsQueueClient::new(sdk_config, &config.queue);
    let depth = queue
        .approximate_depth()
        .await
        .with_context(|| format!("queue {} not reachable", queue.queue_url()))?;
    println!("worker-selfcheck: queue depth {}", depth);
    Ok(())
}

async fn ensure_token_exchange(config: &WorkerConfig, credentials: &Credentials) -> anyhow::Result<()> {
    let publisher = YoutubePublisher::new(config.youtube.clone())?;
    publisher
        .authenticate(&credentials.youtube)
        .await
        .context("refresh token exchange failed")?;
    Ok(())
}
