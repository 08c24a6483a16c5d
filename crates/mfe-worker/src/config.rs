//! Worker configuration.

use std::path::PathBuf;

use mfe_queue::QueueConfig;
use mfe_storage::StorageConfig;
use mfe_youtube::YoutubeConfig;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_UPLOAD_BUCKET: &str = "upload.momentsfrom.earth";
const DEFAULT_ARCHIVE_BUCKET: &str = "archive.momentsfrom.earth";
const DEFAULT_JOB_DONE_TOPIC: &str = "arn:aws:sns:us-east-1:776913033148:MomJobDone";
const DEFAULT_JOB_FAILED_TOPIC: &str = "arn:aws:sns:us-east-1:776913033148:MomJobFail";
const DEFAULT_CREDENTIALS_PATH: &str = "./creds.json";

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// AWS region for SQS, SNS and S3
    pub aws_region: String,
    /// Bucket holding raw uploads, keyed by queue ID
    pub upload_bucket: String,
    /// Bucket receiving archived originals
    pub archive_bucket: String,
    /// Topic for job-completed notifications
    pub job_done_topic: String,
    /// Topic for job-failed notifications
    pub job_failed_topic: String,
    /// Path of the credentials file
    pub credentials_path: PathBuf,
    /// Treat non-200 metadata responses as fatal
    pub strict_metadata: bool,
    /// Queue settings
    pub queue: QueueConfig,
    /// Blob store settings
    pub storage: StorageConfig,
    /// Hosting platform endpoints
    pub youtube: YoutubeConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            aws_region: DEFAULT_REGION.to_string(),
            upload_bucket: DEFAULT_UPLOAD_BUCKET.to_string(),
            archive_bucket: DEFAULT_ARCHIVE_BUCKET.to_string(),
            job_done_topic: DEFAULT_JOB_DONE_TOPIC.to_string(),
            job_failed_topic: DEFAULT_JOB_FAILED_TOPIC.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            strict_metadata: false,
            queue: QueueConfig::default(),
            storage: StorageConfig::default(),
            youtube: YoutubeConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            aws_region: env_or("AWS_REGION", DEFAULT_REGION),
            upload_bucket: env_or("MFE_UPLOAD_BUCKET", DEFAULT_UPLOAD_BUCKET),
            archive_bucket: env_or("MFE_ARCHIVE_BUCKET", DEFAULT_ARCHIVE_BUCKET),
            job_done_topic: env_or("MFE_JOB_DONE_TOPIC", DEFAULT_JOB_DONE_TOPIC),
            job_failed_topic: env_or("MFE_JOB_FAILED_TOPIC", DEFAULT_JOB_FAILED_TOPIC),
            credentials_path: PathBuf::from(env_or(
                "MFE_CREDENTIALS_PATH",
                DEFAULT_CREDENTIALS_PATH,
            )),
            strict_metadata: std::env::var("MFE_STRICT_METADATA")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            queue: QueueConfig::from_env(),
            storage: StorageConfig::from_env(),
            youtube: YoutubeConfig::from_env(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
