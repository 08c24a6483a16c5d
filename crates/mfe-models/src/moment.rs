//! Moment models.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Prefix of every host reference pointing at the video platform.
pub const YOUTUBE_HOST_PREFIX: &str = "youtube";

/// Placeholder reference used until the upload has produced a real id.
const PENDING_HOST_REF: &str = "tbd";

/// Unique identifier of a moment in the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MomentId(pub String);

impl MomentId {
    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MomentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MomentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier assigned when the raw asset was queued.
///
/// Names the source object in the upload bucket and the archived copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueId(pub String);

impl QueueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QueueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reference to the published asset, `<platform>:<external id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(pub String);

impl HostId {
    /// Placeholder set while the moment is being processed.
    pub fn pending() -> Self {
        Self(format!("{}:{}", YOUTUBE_HOST_PREFIX, PENDING_HOST_REF))
    }

    /// Reference to an uploaded video.
    pub fn youtube(external_id: &str) -> Self {
        Self(format!("{}:{}", YOUTUBE_HOST_PREFIX, external_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moment processing status.
///
/// The metadata store treats status as a free-form string; values this
/// worker does not write are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MomentStatus {
    /// Picked up by the worker
    Processing,
    /// Published and waiting for review
    InReview,
    /// Any other value set by the producer or the API
    Other(String),
}

impl MomentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MomentStatus::Processing => "processing",
            MomentStatus::InReview => "inreview",
            MomentStatus::Other(s) => s,
        }
    }
}

impl Default for MomentStatus {
    fn default() -> Self {
        MomentStatus::Other(String::new())
    }
}

impl From<String> for MomentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "processing" => MomentStatus::Processing,
            "inreview" => MomentStatus::InReview,
            _ => MomentStatus::Other(s),
        }
    }
}

impl From<MomentStatus> for String {
    fn from(status: MomentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for MomentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single media asset to publish.
///
/// This is both the queue message body and the record sent to the metadata
/// store, which always receives the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Moment {
    /// Key of the source system
    #[serde(deserialize_with = "null_as_default")]
    pub mfe_key: String,
    /// Moment ID
    #[serde(deserialize_with = "null_as_default")]
    pub moment_id: MomentId,
    /// Title
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Description
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    /// Original filename
    #[serde(deserialize_with = "null_as_default")]
    pub filename: String,
    /// Media type
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub media_type: String,
    /// Size in bytes
    #[serde(deserialize_with = "null_as_default")]
    pub size: u64,
    /// Location of the raw asset in the upload bucket
    #[serde(deserialize_with = "null_as_default")]
    pub queue_id: QueueId,
    /// Processing status
    #[serde(deserialize_with = "null_as_default")]
    pub status: MomentStatus,
    /// Creator ID
    #[serde(deserialize_with = "null_as_default")]
    pub creator: String,
    /// Creation timestamp
    #[serde(deserialize_with = "null_as_default")]
    pub created: i64,
    /// Last update timestamp
    #[serde(deserialize_with = "null_as_default")]
    pub updated: i64,
    /// Hosting platform reference
    #[serde(deserialize_with = "null_as_default")]
    pub host_id: HostId,
}

/// Decode an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Moment {
    /// Parse a moment from its JSON wire form.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Enter the processing checkpoint.
    pub fn mark_processing(&mut self) {
        self.status = MomentStatus::Processing;
        self.host_id = HostId::pending();
    }

    /// Enter the review checkpoint with the platform's reference.
    pub fn mark_in_review(&mut self, external_id: &str) {
        self.status = MomentStatus::InReview;
        self.host_id = HostId::youtube(external_id);
    }
}
