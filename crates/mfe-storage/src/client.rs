//! S3 client implementation.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the S3 client.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Custom S3-compatible endpoint (e.g. LocalStack); forces path-style addressing
    pub endpoint_url: Option<String>,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoint_url: std::env::var("S3_ENDPOINT_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Object storage holding raw and archived media.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download an object into memory.
    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Server-side copy of an object.
    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> StorageResult<()>;

    /// Delete an object.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;
}

/// S3 blob store client.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    /// Create a new client from a loaded AWS config.
    pub fn new(sdk_config: &SdkConfig, config: &StorageConfig) -> Self {
        let mut builder = Builder::from(sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Check a bucket is reachable with the current credentials.
    pub async fn check_bucket(&self, bucket: &str) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::AwsSdk(format!(
                    "bucket {} unreachable: {}",
                    bucket,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

/// `CopySource` value: bucket plus URL-encoded key.
fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, urlencoding::encode(key))
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::not_found(format!("s3://{}/{}", bucket, key))
                } else {
                    StorageError::download_failed(DisplayErrorContext(&e).to_string())
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?
            .into_bytes()
            .to_vec();

        info!("Downloaded {} bytes from s3://{}/{}", bytes.len(), bucket, key);
        Ok(bytes)
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> StorageResult<()> {
        debug!(
            "Copying s3://{}/{} to s3://{}/{}",
            src_bucket, src_key, dst_bucket, dst_key
        );

        self.client
            .copy_object()
            .copy_source(copy_source(src_bucket, src_key))
            .bucket(dst_bucket)
            .key(dst_key)
            .send()
            .await
            .map_err(|e| StorageError::copy_failed(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        debug!("Deleting s3://{}/{}", bucket, key);

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
