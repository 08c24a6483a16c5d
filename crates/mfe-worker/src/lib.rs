//! Moment publishing worker.
//!
//! This crate provides:
//! - Configuration and credential loading
//! - The per-job publishing pipeline
//! - The queue drain loop and its termination check
//! - Failure escalation (one failure notification, non-zero exit)

pub mod config;
pub mod context;
pub mod credentials;
pub mod drainer;
pub mod error;
pub mod escalation;
pub mod logging;
pub mod metrics;
pub mod processor;

pub use config::WorkerConfig;
pub use context::{Services, WorkerContext};
pub use credentials::{ApiCredentials, Credentials};
pub use drainer::{is_drained, DrainSummary, Drainer};
pub use error::{ErrorKind, WorkerError, WorkerResult};
pub use escalation::{escalate, run_to_completion, Escalation, WorkerExit};
pub use logging::JobLogger;
pub use processor::{JobFailure, JobProcessor, PipelineStep};
