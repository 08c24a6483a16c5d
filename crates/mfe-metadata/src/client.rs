//! Moments API HTTP client.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use mfe_models::Moment;

use crate::error::{MetadataError, MetadataResult};

const DEFAULT_BASE_URL: &str = "https://api.momentsfrom.earth";

/// Configuration for the metadata client.
#[derive(Clone)]
pub struct MetadataConfig {
    /// Base URL of the moments API
    pub base_url: String,
    /// API key sent as the `api_key` query parameter
    pub api_key: String,
}

impl fmt::Debug for MetadataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl MetadataConfig {
    /// Create config from environment variables; the API key comes from the
    /// credentials file, not the environment.
    pub fn from_env(api_key: impl Into<String>) -> Self {
        Self {
            base_url: std::env::var("MFE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
        }
    }
}

/// How the metadata store answered an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// 200 OK
    Accepted,
    /// Any other status
    Rejected { status: u16, body: String },
}

impl UpdateOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, UpdateOutcome::Accepted)
    }
}

/// Remote store of authoritative moment records.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Overwrite the stored record with `moment`.
    ///
    /// Only transport failures are errors; a non-200 answer is reported as
    /// [`UpdateOutcome::Rejected`].
    async fn update_status(&self, moment: &Moment) -> MetadataResult<UpdateOutcome>;
}

/// HTTP client for the moments API.
pub struct MetadataClient {
    http: Client,
    config: MetadataConfig,
}

impl MetadataClient {
    /// Create a new metadata client. Requests carry no client-side timeout.
    pub fn new(config: MetadataConfig) -> MetadataResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| MetadataError::ClientSetup(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn callback_url(&self, moment: &Moment) -> String {
        format!("{}/moment/{}/callback", self.config.base_url, moment.moment_id)
    }
}

#[async_trait]
impl MetadataService for MetadataClient {
    async fn update_status(&self, moment: &Moment) -> MetadataResult<UpdateOutcome> {
        let payload = moment.to_json()?;
        debug!(moment_id = %moment.moment_id, "Moment update payload: {}", payload);

        let response = self
            .http
            .put(self.callback_url(moment))
            .query(&[("api_key", self.config.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(UpdateOutcome::Accepted);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            moment_id = %moment.moment_id,
            "Invalid status code from moment update: {}",
            status
        );
        Ok(UpdateOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
