//! YouTube Data API client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, RedirectUrl, RefreshToken, RequestTokenError,
    Scope, TokenResponse, TokenUrl,
};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response};
use tracing::{debug, info};

use crate::error::{PublishError, PublishResult};
use crate::types::{UploadedVideo, VideoResource, YoutubeCredentials};

/// Consent endpoint; never visited by the worker but required by the client.
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Media type announced for the uploaded bytes; YouTube sniffs the container.
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Configuration for the YouTube client.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    /// OAuth2 token endpoint
    pub token_url: String,
    /// Resumable upload endpoint for video inserts
    pub upload_url: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
        }
    }
}

impl YoutubeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            token_url: std::env::var("YOUTUBE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            upload_url: std::env::var("YOUTUBE_UPLOAD_URL")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string()),
        }
    }
}

/// Short-lived bearer token obtained from the refresh grant.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_in: Option<Duration>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            secret: secret.into(),
            expires_in,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Pushes raw media to the hosting platform.
#[async_trait]
pub trait VideoPublisher: Send + Sync {
    /// Exchange the static refresh token for an access token.
    async fn authenticate(&self, credentials: &YoutubeCredentials) -> PublishResult<AccessToken>;

    /// Upload `video` and return the platform's video ID.
    async fn publish(
        &self,
        token: &AccessToken,
        title: &str,
        video: Vec<u8>,
    ) -> PublishResult<String>;
}

/// Client for the YouTube Data API v3.
pub struct YoutubePublisher {
    http: Client,
    config: YoutubeConfig,
}

impl YoutubePublisher {
    /// Create a new publisher.
    ///
    /// No request timeout is set: uploads run as long as the transfer takes.
    pub fn new(config: YoutubeConfig) -> PublishResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| PublishError::ClientSetup(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// OAuth2 client for the registered application.
    ///
    /// Client credentials go in the request body, which is what Google's
    /// token endpoint expects for installed apps.
    fn oauth_client(&self, credentials: &YoutubeCredentials) -> PublishResult<BasicClient> {
        let auth_url = AuthUrl::new(AUTH_URL.to_string())
            .map_err(|e| PublishError::ClientSetup(format!("auth url: {}", e)))?;
        let token_url = TokenUrl::new(self.config.token_url.clone())
            .map_err(|e| PublishError::ClientSetup(format!("token url: {}", e)))?;

        let mut client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody);

        if !credentials.redirect_url.is_empty() {
            let redirect = RedirectUrl::new(credentials.redirect_url.clone())
                .map_err(|e| PublishError::ClientSetup(format!("redirect url: {}", e)))?;
            client = client.set_redirect_uri(redirect);
        }

        Ok(client)
    }

    /// Open a resumable upload session and return its session URI.
    async fn open_session(
        &self,
        token: &AccessToken,
        title: &str,
        content_length: usize,
    ) -> PublishResult<String> {
        let response = self
            .http
            .post(&self.config.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(token.secret())
            .header("X-Upload-Content-Type", UPLOAD_CONTENT_TYPE)
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(&VideoResource::unlisted(title))
            .send()
            .await
            .map_err(|e| PublishError::upload_failed(format!("session request failed: {}", e)))?;

        let response = ensure_success(response, "session request").await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| PublishError::upload_failed("no Location header in session response"))
    }
}

/// Turn a non-2xx response into an upload error carrying status and body.
async fn ensure_success(response: Response, stage: &str) -> PublishResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(PublishError::upload_failed(format!(
        "{} returned {}: {}",
        stage, status, body
    )))
}

#[async_trait]
impl VideoPublisher for YoutubePublisher {
    async fn authenticate(&self, credentials: &YoutubeCredentials) -> PublishResult<AccessToken> {
        debug!("Exchanging refresh token at {}", self.config.token_url);

        let refresh_token = RefreshToken::new(credentials.refresh_token.clone());
        let token = self
            .oauth_client(credentials)?
            .exchange_refresh_token(&refresh_token)
            .add_scopes(credentials.scopes.iter().cloned().map(Scope::new))
            .request_async(async_http_client)
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => {
                    PublishError::auth_failed(format!("token endpoint refused: {}", response))
                }
                RequestTokenError::Request(e) => {
                    PublishError::auth_failed(format!("token request failed: {}", e))
                }
                RequestTokenError::Parse(e, _) => {
                    PublishError::auth_failed(format!("invalid token response: {}", e))
                }
                RequestTokenError::Other(msg) => PublishError::auth_failed(msg),
            })?;

        let secret = token.access_token().secret();
        if secret.is_empty() {
            return Err(PublishError::auth_failed("token response has no access_token"));
        }

        Ok(AccessToken::new(secret.clone(), token.expires_in()))
    }

    async fn publish(
        &self,
        token: &AccessToken,
        title: &str,
        video: Vec<u8>,
    ) -> PublishResult<String> {
        let size = video.len();
        let session_uri = self.open_session(token, title, size).await?;
        debug!("Opened upload session for {} ({} bytes)", title, size);

        let response = self
            .http
            .put(&session_uri)
            .bearer_auth(token.secret())
            .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
            .body(video)
            .send()
            .await
            .map_err(|e| PublishError::upload_failed(format!("media upload failed: {}", e)))?;

        let response = ensure_success(response, "media upload").await?;

        let uploaded: UploadedVideo = response
            .json()
            .await
            .map_err(|e| PublishError::upload_failed(format!("invalid upload response: {}", e)))?;

        if uploaded.id.is_empty() {
            return Err(PublishError::upload_failed("upload response has no video id"));
        }

        info!("Uploaded {} as video {}", title, uploaded.id);
        Ok(uploaded.id)
    }
}
