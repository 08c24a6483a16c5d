//! YouTube publisher.
//!
//! This crate provides:
//! - OAuth2 refresh-token exchange for a short-lived access token
//! - Resumable video upload with fixed category, visibility and tags

pub mod client;
pub mod error;
pub mod types;

pub use client::{AccessToken, VideoPublisher, YoutubeConfig, YoutubePublisher};
pub use error::{PublishError, PublishResult};
pub use types::YoutubeCredentials;
