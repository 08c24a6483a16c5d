//! Per-job publishing pipeline.
//!
//! Every job runs the same fixed sequence of steps. The first failing step
//! aborts the job; nothing already done is rolled back.

use std::fmt;
use std::time::Instant;

use tracing::Instrument;

use mfe_metadata::UpdateOutcome;
use mfe_models::{Moment, MomentId};
use mfe_queue::{Job, ReceiptHandle};

use crate::context::WorkerContext;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    /// Record `processing` status with the metadata store
    MarkingProcessing,
    /// Fetch the raw video from the upload bucket
    Downloading,
    /// Exchange the refresh token and upload to the hosting platform
    Publishing,
    /// Copy the raw video into the archive bucket
    Archiving,
    /// Remove the raw video from the upload bucket
    DeletingSource,
    /// Acknowledge the queue message
    DeletingQueueEntry,
    /// Record `inreview` status and the external video ID
    MarkingReviewed,
    /// Announce completion on the job-done topic
    NotifyingSuccess,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::MarkingProcessing => "mark_processing",
            PipelineStep::Downloading => "download",
            PipelineStep::Publishing => "publish",
            PipelineStep::Archiving => "archive",
            PipelineStep::DeletingSource => "delete_source",
            PipelineStep::DeletingQueueEntry => "delete_queue_entry",
            PipelineStep::MarkingReviewed => "mark_in_review",
            PipelineStep::NotifyingSuccess => "notify_success",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job that stopped at `step`.
#[derive(Debug)]
pub struct JobFailure {
    pub moment_id: MomentId,
    pub step: PipelineStep,
    pub error: WorkerError,
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "moment {} failed at {}: {}",
            self.moment_id, self.step, self.error
        )
    }
}

impl std::error::Error for JobFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Tracks the step in flight so a failure can be attributed to it.
struct StepTracker {
    logger: JobLogger,
    current: PipelineStep,
    started: Instant,
}

impl StepTracker {
    fn new(logger: JobLogger) -> Self {
        Self {
            logger,
            current: PipelineStep::MarkingProcessing,
            started: Instant::now(),
        }
    }

    fn begin(&mut self, step: PipelineStep) {
        self.current = step;
        self.started = Instant::now();
        self.logger.log_step_started(step);
    }

    fn finish(&self) {
        let elapsed = self.started.elapsed();
        self.logger.log_step_finished(self.current, elapsed);
        metrics::record_step(self.current, "succeeded", elapsed);
    }

    fn fail(&self, error: &WorkerError) {
        metrics::record_step(self.current, "failed", self.started.elapsed());
        self.logger.log_error(
            self.current,
            &format!("{} ({})", error, error.kind()),
        );
    }
}

/// Runs the publishing pipeline for one job.
pub struct JobProcessor<'a> {
    ctx: &'a WorkerContext,
}

impl<'a> JobProcessor<'a> {
    pub fn new(ctx: &'a WorkerContext) -> Self {
        Self { ctx }
    }

    /// Process one job end to end, returning the external video ID.
    pub async fn process(&self, job: Job) -> Result<String, JobFailure> {
        let (mut moment, handle) = job.into_parts();
        let logger = JobLogger::new(&moment);
        let span = logger.create_span();
        let mut tracker = StepTracker::new(logger.clone());

        logger.log_start();

        let result = self
            .run_steps(&mut moment, handle, &mut tracker)
            .instrument(span)
            .await;

        match result {
            Ok(external_id) => {
                logger.log_completion(&external_id);
                metrics::record_job("succeeded");
                Ok(external_id)
            }
            Err(error) => {
                tracker.fail(&error);
                metrics::record_job("failed");
                Err(JobFailure {
                    moment_id: moment.moment_id.clone(),
                    step: tracker.current,
                    error,
                })
            }
        }
    }

    async fn run_steps(
        &self,
        moment: &mut Moment,
        handle: ReceiptHandle,
        tracker: &mut StepTracker,
    ) -> WorkerResult<String> {
        let config = &self.ctx.config;
        let services = &self.ctx.services;
        let queue_key = moment.queue_id.as_str().to_string();

        tracker.begin(PipelineStep::MarkingProcessing);
        moment.mark_processing();
        self.update_metadata(moment, tracker).await?;
        tracker.finish();

        tracker.begin(PipelineStep::Downloading);
        let video = services
            .storage
            .download(&config.upload_bucket, &queue_key)
            .await?;
        tracker.finish();

        // The buffer moves into the upload and is released when it returns.
        tracker.begin(PipelineStep::Publishing);
        let token = services
            .publisher
            .authenticate(&self.ctx.credentials.youtube)
            .await?;
        let external_id = services
            .publisher
            .publish(&token, moment.moment_id.as_str(), video)
            .await?;
        tracker.finish();

        tracker.begin(PipelineStep::Archiving);
        services
            .storage
            .copy(
                &config.upload_bucket,
                &queue_key,
                &config.archive_bucket,
                &queue_key,
            )
            .await?;
        tracker.finish();

        tracker.begin(PipelineStep::DeletingSource);
        services
            .storage
            .delete(&config.upload_bucket, &queue_key)
            .await?;
        tracker.finish();

        tracker.begin(PipelineStep::DeletingQueueEntry);
        services.queue.delete_job(handle).await?;
        tracker.finish();

        tracker.begin(PipelineStep::MarkingReviewed);
        moment.mark_in_review(&external_id);
        self.update_metadata(moment, tracker).await?;
        tracker.finish();

        tracker.begin(PipelineStep::NotifyingSuccess);
        services
            .notifier
            .publish(&config.job_done_topic, moment.moment_id.as_str())
            .await?;
        tracker.finish();

        Ok(external_id)
    }

    /// Push the current record. A non-200 answer only fails the job in
    /// strict mode.
    async fn update_metadata(&self, moment: &Moment, tracker: &StepTracker) -> WorkerResult<()> {
        match self.ctx.services.metadata.update_status(moment).await? {
            UpdateOutcome::Accepted => Ok(()),
            UpdateOutcome::Rejected { status, body } if self.ctx.config.strict_metadata => {
                Err(WorkerError::MetadataRejected { status, body })
            }
            UpdateOutcome::Rejected { status, .. } => {
                tracker.logger.log_warning(&format!(
                    "metadata update answered {}, continuing",
                    status
                ));
                Ok(())
            }
        }
    }
}
