//! Failure escalation and process exit status.

use std::fmt;
use std::process::ExitCode;

use tracing::{error, info, warn};

use mfe_models::MomentId;
use mfe_queue::NotificationService;

use crate::context::WorkerContext;
use crate::drainer::Drainer;
use crate::error::WorkerError;
use crate::processor::{JobFailure, PipelineStep};

/// A fatal error on its way to the failure topic.
#[derive(Debug)]
pub struct Escalation {
    /// Moment in flight, if any
    pub moment_id: Option<MomentId>,
    /// Step that failed, if a job was running
    pub step: Option<PipelineStep>,
    pub error: WorkerError,
}

impl Escalation {
    /// Failure outside any job: startup, fetch, or depth lookup.
    pub fn without_job(error: WorkerError) -> Self {
        Self {
            moment_id: None,
            step: None,
            error,
        }
    }

    /// Body of the failure notification: the moment ID, or empty.
    pub fn notification_message(&self) -> &str {
        self.moment_id.as_ref().map(|id| id.as_str()).unwrap_or("")
    }
}

impl From<JobFailure> for Escalation {
    fn from(failure: JobFailure) -> Self {
        Self {
            moment_id: Some(failure.moment_id),
            step: Some(failure.step),
            error: failure.error,
        }
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.moment_id, self.step) {
            (Some(id), Some(step)) => write!(f, "moment {} failed at {}: {}", id, step, self.error),
            _ => write!(f, "{}", self.error),
        }
    }
}

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Queue drained with every job processed
    Drained,
    /// A failure was escalated
    Failed,
}

impl WorkerExit {
    pub fn code(&self) -> u8 {
        match self {
            WorkerExit::Drained => 0,
            WorkerExit::Failed => 1,
        }
    }
}

impl From<WorkerExit> for ExitCode {
    fn from(exit: WorkerExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Log the failure, publish one failure notification, and report a failed
/// exit. A notification error is logged and does not change the outcome.
pub async fn escalate(
    notifier: &dyn NotificationService,
    failed_topic: &str,
    escalation: &Escalation,
) -> WorkerExit {
    error!(
        moment_id = escalation.notification_message(),
        step = escalation.step.map(|s| s.as_str()).unwrap_or("none"),
        kind = escalation.error.kind().as_str(),
        "Fatal error: {}", escalation
    );

    if let Err(e) = notifier
        .publish(failed_topic, escalation.notification_message())
        .await
    {
        warn!("Failed to publish failure notification: {}", e);
    }

    WorkerExit::Failed
}

/// Drain the queue and map the result to an exit status, escalating any
/// failure.
pub async fn run_to_completion(ctx: &WorkerContext) -> WorkerExit {
    match Drainer::new(ctx).run().await {
        Ok(summary) => {
            info!(
                jobs_processed = summary.jobs_processed,
                fetches = summary.fetches,
                retries = summary.retries,
                "Worker finished"
            );
            WorkerExit::Drained
        }
        Err(escalation) => {
            escalate(
                ctx.services.notifier.as_ref(),
                &ctx.config.job_failed_topic,
                &escalation,
            )
            .await
        }
    }
}
