//! In-memory fakes for every external service, recording calls in order.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use mfe_metadata::{MetadataResult, MetadataService, UpdateOutcome};
use mfe_models::Moment;
use mfe_queue::{
    Job, NotificationService, QueueClient, QueueError, QueueMessage, QueueResult, ReceiptHandle,
};
use mfe_storage::{BlobStore, StorageError, StorageResult};
use mfe_youtube::{AccessToken, PublishError, PublishResult, VideoPublisher, YoutubeCredentials};
use mfe_worker::{ApiCredentials, Credentials, Services, WorkerConfig, WorkerContext};

pub const UPLOAD: &str = "upload-bucket";
pub const ARCHIVE: &str = "archive-bucket";
pub const DONE: &str = "topic:done";
pub const FAILED: &str = "topic:failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch,
    Depth,
    DeleteJob(String),
    Download { bucket: String, key: String },
    Copy { from: String, to: String, key: String },
    DeleteObject { bucket: String, key: String },
    Authenticate,
    Publish { title: String, bytes: usize },
    UpdateMetadata { moment_id: String, status: String, host_id: String },
    Notify { topic: String, message: String },
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Which calls should fail, keyed by the moment, queue ID or topic involved.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fetch: bool,
    pub depth: bool,
    pub download: Option<String>,
    pub authenticate: bool,
    pub publish: Option<String>,
    pub copy: Option<String>,
    pub delete_object: Option<String>,
    pub delete_job: Option<String>,
    pub metadata_transport: Option<String>,
    /// Moment whose final "inreview" update fails in transport
    pub metadata_in_review: Option<String>,
    pub metadata_status: Option<u16>,
    pub notify_topic: Option<String>,
}

/// Build a queue message for moment `m{n}` stored under queue ID `v{n}`.
pub fn message(n: usize) -> QueueMessage {
    let body = serde_json::json!({
        "mfe_key": format!("mfe-{}", n),
        "moment_id": format!("m{}", n),
        "title": format!("Moment {}", n),
        "filename": format!("clip{}.mp4", n),
        "type": "video/mp4",
        "size": 5,
        "queue_id": format!("v{}", n),
        "status": "queued",
        "creator": "earthling",
        "created": 1_545_000_000,
        "updated": 1_545_000_000,
        "host_id": ""
    })
    .to_string();

    let message_id = format!("msg-{}", n);
    let handle = format!("h{}", n);
    QueueMessage::new(Some(&message_id), Some(&handle), Some(&body))
}

pub fn messages(range: std::ops::RangeInclusive<usize>) -> Vec<QueueMessage> {
    range.map(message).collect()
}

/// A message whose body is not a moment.
pub fn malformed_message(handle: &str) -> QueueMessage {
    QueueMessage::new(Some("msg-bad"), Some(handle), Some("not a moment"))
}

pub fn job(n: usize) -> Job {
    message(n).decode().expect("valid job message")
}

struct FakeQueue {
    log: CallLog,
    faults: Faults,
    batches: Mutex<VecDeque<Vec<QueueMessage>>>,
    depths: Mutex<VecDeque<u64>>,
}

#[async_trait]
impl QueueClient for FakeQueue {
    async fn fetch_batch(
        &self,
        max_messages: usize,
        _wait: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        self.log.lock().unwrap().push(Call::Fetch);
        if self.faults.fetch {
            return Err(QueueError::receive_failed("connection reset"));
        }
        let batch = self.batches.lock().unwrap().pop_front().unwrap_or_default();
        assert!(batch.len() <= max_messages, "batch larger than requested");
        Ok(batch)
    }

    async fn delete_job(&self, handle: ReceiptHandle) -> QueueResult<()> {
        let handle = handle.as_str().to_string();
        self.log.lock().unwrap().push(Call::DeleteJob(handle.clone()));
        if self.faults.delete_job.as_deref() == Some(handle.as_str()) {
            return Err(QueueError::delete_failed("receipt handle expired"));
        }
        Ok(())
    }

    async fn approximate_depth(&self) -> QueueResult<u64> {
        self.log.lock().unwrap().push(Call::Depth);
        if self.faults.depth {
            return Err(QueueError::attributes_failed("access denied"));
        }
        Ok(self.depths.lock().unwrap().pop_front().unwrap_or(0))
    }
}

struct FakeStore {
    log: CallLog,
    faults: Faults,
}

#[async_trait]
impl BlobStore for FakeStore {
    async fn download(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.log.lock().unwrap().push(Call::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        if self.faults.download.as_deref() == Some(key) {
            return Err(StorageError::not_found(format!("{}/{}", bucket, key)));
        }
        Ok(b"video".to_vec())
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> StorageResult<()> {
        assert_eq!(src_key, dst_key, "archive keeps the queue ID as key");
        self.log.lock().unwrap().push(Call::Copy {
            from: src_bucket.to_string(),
            to: dst_bucket.to_string(),
            key: src_key.to_string(),
        });
        if self.faults.copy.as_deref() == Some(src_key) {
            return Err(StorageError::copy_failed("access denied"));
        }
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.log.lock().unwrap().push(Call::DeleteObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        if self.faults.delete_object.as_deref() == Some(key) {
            return Err(StorageError::delete_failed("access denied"));
        }
        Ok(())
    }
}

struct FakePublisher {
    log: CallLog,
    faults: Faults,
}

#[async_trait]
impl VideoPublisher for FakePublisher {
    async fn authenticate(&self, credentials: &YoutubeCredentials) -> PublishResult<AccessToken> {
        assert_eq!(credentials.refresh_token, "refresh");
        self.log.lock().unwrap().push(Call::Authenticate);
        if self.faults.authenticate {
            return Err(PublishError::auth_failed("invalid_grant"));
        }
        Ok(AccessToken::new("token", Some(Duration::from_secs(3600))))
    }

    async fn publish(&self, token: &AccessToken, title: &str, video: Vec<u8>) -> PublishResult<String> {
        assert_eq!(token.secret(), "token");
        self.log.lock().unwrap().push(Call::Publish {
            title: title.to_string(),
            bytes: video.len(),
        });
        if self.faults.publish.as_deref() == Some(title) {
            return Err(PublishError::upload_failed("quotaExceeded"));
        }
        Ok(format!("yt-{}", title))
    }
}

struct FakeMetadata {
    log: CallLog,
    faults: Faults,
}

#[async_trait]
impl MetadataService for FakeMetadata {
    async fn update_status(&self, moment: &Moment) -> MetadataResult<UpdateOutcome> {
        self.log.lock().unwrap().push(Call::UpdateMetadata {
            moment_id: moment.moment_id.to_string(),
            status: moment.status.as_str().to_string(),
            host_id: moment.host_id.as_str().to_string(),
        });
        let in_review_fault = moment.status.as_str() == "inreview"
            && self.faults.metadata_in_review.as_deref() == Some(moment.moment_id.as_str());
        if in_review_fault
            || self.faults.metadata_transport.as_deref() == Some(moment.moment_id.as_str())
        {
            let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
            return Err(err.into());
        }
        Ok(match self.faults.metadata_status {
            Some(status) => UpdateOutcome::Rejected {
                status,
                body: "rejected".to_string(),
            },
            None => UpdateOutcome::Accepted,
        })
    }
}

pub struct FakeNotifier {
    log: CallLog,
    faults: Faults,
}

impl FakeNotifier {
    pub fn new(log: CallLog, faults: Faults) -> Self {
        Self { log, faults }
    }
}

#[async_trait]
impl NotificationService for FakeNotifier {
    async fn publish(&self, topic: &str, message: &str) -> QueueResult<String> {
        self.log.lock().unwrap().push(Call::Notify {
            topic: topic.to_string(),
            message: message.to_string(),
        });
        if self.faults.notify_topic.as_deref() == Some(topic) {
            return Err(QueueError::publish_failed("topic does not exist"));
        }
        Ok("sns-message-id".to_string())
    }
}

pub struct Harness {
    pub log: CallLog,
    pub ctx: WorkerContext,
}

impl Harness {
    pub fn new(batches: Vec<Vec<QueueMessage>>, depths: Vec<u64>, faults: Faults) -> Self {
        Self::with_config(batches, depths, faults, |_| {})
    }

    pub fn with_config(
        batches: Vec<Vec<QueueMessage>>,
        depths: Vec<u64>,
        faults: Faults,
        configure: impl FnOnce(&mut WorkerConfig),
    ) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));

        let mut config = WorkerConfig {
            upload_bucket: UPLOAD.to_string(),
            archive_bucket: ARCHIVE.to_string(),
            job_done_topic: DONE.to_string(),
            job_failed_topic: FAILED.to_string(),
            ..Default::default()
        };
        configure(&mut config);

        let credentials = Credentials {
            mfe: ApiCredentials {
                api_key: "key".to_string(),
            },
            youtube: YoutubeCredentials {
                client_id: "client".to_string(),
                refresh_token: "refresh".to_string(),
                ..Default::default()
            },
        };

        let services = Services {
            queue: Arc::new(FakeQueue {
                log: log.clone(),
                faults: faults.clone(),
                batches: Mutex::new(batches.into()),
                depths: Mutex::new(depths.into()),
            }),
            storage: Arc::new(FakeStore {
                log: log.clone(),
                faults: faults.clone(),
            }),
            publisher: Arc::new(FakePublisher {
                log: log.clone(),
                faults: faults.clone(),
            }),
            metadata: Arc::new(FakeMetadata {
                log: log.clone(),
                faults: faults.clone(),
            }),
            notifier: Arc::new(FakeNotifier::new(log.clone(), faults)),
        };

        Self {
            log,
            ctx: WorkerContext::new(config, credentials, services),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    /// Messages published to `topic`, in order.
    pub fn notifications(&self, topic: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Notify { topic: t, message } if t == topic => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }
}

/// The calls one successful job makes, in order.
pub fn success_calls(n: usize) -> Vec<Call> {
    let moment_id = format!("m{}", n);
    let queue_id = format!("v{}", n);
    vec![
        Call::UpdateMetadata {
            moment_id: moment_id.clone(),
            status: "processing".to_string(),
            host_id: "youtube:tbd".to_string(),
        },
        Call::Download {
            bucket: UPLOAD.to_string(),
            key: queue_id.clone(),
        },
        Call::Authenticate,
        Call::Publish {
            title: moment_id.clone(),
            bytes: 5,
        },
        Call::Copy {
            from: UPLOAD.to_string(),
            to: ARCHIVE.to_string(),
            key: queue_id.clone(),
        },
        Call::DeleteObject {
            bucket: UPLOAD.to_string(),
            key: queue_id,
        },
        Call::DeleteJob(format!("h{}", n)),
        Call::UpdateMetadata {
            moment_id: moment_id.clone(),
            status: "inreview".to_string(),
            host_id: format!("youtube:yt-m{}", n),
        },
        Call::Notify {
            topic: DONE.to_string(),
            message: moment_id,
        },
    ]
}
