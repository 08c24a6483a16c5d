//! YouTube API request/response types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// "Film & Animation".
pub const CATEGORY_ID: &str = "1";

/// Uploads are reachable by link only.
pub const PRIVACY_STATUS: &str = "unlisted";

/// Tags attached to every upload.
pub const TAGS: [&str; 2] = ["momentsfromearth", "moment"];

/// OAuth client registration plus the long-lived refresh token.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct YoutubeCredentials {
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub refresh_token: String,
}

impl fmt::Debug for YoutubeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoutubeCredentials")
            .field("scopes", &self.scopes)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Video resource sent when opening an upload session.
#[derive(Debug, Serialize)]
pub struct VideoResource {
    pub snippet: VideoSnippet,
    pub status: VideoStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    pub category_id: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    pub privacy_status: String,
}

impl VideoResource {
    /// Unlisted upload with the fixed category and tag set.
    pub fn unlisted(title: impl Into<String>) -> Self {
        Self {
            snippet: VideoSnippet {
                title: title.into(),
                category_id: CATEGORY_ID.to_string(),
                tags: TAGS.iter().map(|t| t.to_string()).collect(),
            },
            status: VideoStatus {
                privacy_status: PRIVACY_STATUS.to_string(),
            },
        }
    }
}

/// Subset of the video resource returned once the upload completes.
#[derive(Debug, Deserialize)]
pub struct UploadedVideo {
    #[serde(default)]
    pub id: String,
}
