//! Job types for the queue.

use std::fmt;

use mfe_models::Moment;

use crate::error::{QueueError, QueueResult};

/// Opaque delivery handle used to delete a received message.
///
/// Not `Clone`: a handle is handed back to the queue exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Receipt handles are long; the tail is enough to correlate logs.
        let tail = self.0.len().saturating_sub(12);
        match self.0.get(tail..) {
            Some(suffix) if tail > 0 => write!(f, "…{}", suffix),
            _ => write!(f, "{}", self.0),
        }
    }
}

/// A message as received, before its body is decoded.
#[derive(Debug, Clone, Default)]
pub struct QueueMessage {
    pub message_id: Option<String>,
    pub receipt_handle: Option<String>,
    pub body: Option<String>,
}

impl QueueMessage {
    pub fn new(
        message_id: Option<&str>,
        receipt_handle: Option<&str>,
        body: Option<&str>,
    ) -> Self {
        Self {
            message_id: message_id.map(str::to_string),
            receipt_handle: receipt_handle.map(str::to_string),
            body: body.map(str::to_string),
        }
    }

    /// Decode the body into a job.
    pub fn decode(&self) -> QueueResult<Job> {
        Job::from_message(
            self.message_id.as_deref(),
            self.receipt_handle.as_deref(),
            self.body.as_deref(),
        )
    }

    /// Handle for removing this message, if it carries a usable one.
    pub fn into_receipt_handle(self) -> Option<ReceiptHandle> {
        self.receipt_handle
            .filter(|h| !h.is_empty())
            .map(ReceiptHandle::new)
    }
}

/// One received queue message: its delivery handle and the moment it carries.
#[derive(Debug)]
pub struct Job {
    /// Queue-assigned message ID
    pub message_id: String,
    /// Handle to delete the message once fully processed
    pub receipt_handle: ReceiptHandle,
    /// Moment to publish
    pub moment: Moment,
}

impl Job {
    /// Build a job from a raw queue message.
    pub fn from_message(
        message_id: Option<&str>,
        receipt_handle: Option<&str>,
        body: Option<&str>,
    ) -> QueueResult<Self> {
        let message_id = message_id.unwrap_or_default().to_string();

        let receipt_handle = receipt_handle
            .filter(|h| !h.is_empty())
            .ok_or_else(|| QueueError::malformed(&message_id, "missing receipt handle"))?;

        let body = body.ok_or_else(|| QueueError::malformed(&message_id, "missing body"))?;

        let moment = Moment::from_json(body)
            .map_err(|e| QueueError::malformed(&message_id, e.to_string()))?;

        Ok(Self {
            message_id,
            receipt_handle: ReceiptHandle::new(receipt_handle),
            moment,
        })
    }

    /// Split into the moment and the handle that acknowledges it.
    pub fn into_parts(self) -> (Moment, ReceiptHandle) {
        (self.moment, self.receipt_handle)
    }
}
