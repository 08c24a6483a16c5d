//! Credentials file loading.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use mfe_youtube::YoutubeCredentials;

use crate::error::{WorkerError, WorkerResult};

/// Moments API credentials.
#[derive(Clone, Default, Deserialize)]
pub struct ApiCredentials {
    #[serde(default)]
    pub api_key: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Process-wide credentials, read once at startup and never reloaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(rename = "MFE", alias = "mfe", alias = "Mfe")]
    pub mfe: ApiCredentials,
    #[serde(rename = "YouTube", alias = "youtube", alias = "Youtube")]
    pub youtube: YoutubeCredentials,
}

impl Credentials {
    /// Read and validate the credentials file.
    pub fn load(path: impl AsRef<Path>) -> WorkerResult<Self> {
        let path = path.as_ref();

        let raw = std::fs::read_to_string(path).map_err(|e| {
            WorkerError::config_error(format!("could not read {}: {}", path.display(), e))
        })?;

        let credentials = Self::parse(&raw).map_err(|e| match e {
            WorkerError::Config(msg) => {
                WorkerError::config_error(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!(
            "Loaded credentials from {} ({} YouTube scopes)",
            path.display(),
            credentials.youtube.scopes.len()
        );
        Ok(credentials)
    }

    /// Parse and validate credentials JSON.
    pub fn parse(raw: &str) -> WorkerResult<Self> {
        let credentials: Credentials = serde_json::from_str(raw)
            .map_err(|e| WorkerError::config_error(format!("could not parse credentials: {}", e)))?;
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> WorkerResult<()> {
        let missing = [
            ("MFE.api_key", self.mfe.api_key.is_empty()),
            ("YouTube.client_id", self.youtube.client_id.is_empty()),
            ("YouTube.refresh_token", self.youtube.refresh_token.is_empty()),
        ];

        match missing.iter().find(|(_, empty)| *empty) {
            Some((field, _)) => Err(WorkerError::config_error(format!("{} is empty", field))),
            None => Ok(()),
        }
    }
}
