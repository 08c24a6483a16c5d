//! Tracing setup and structured job logging.

use std::time::Duration;

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mfe_models::Moment;

use crate::processor::PipelineStep;

/// Initialize tracing: colored output for dev, JSON when `LOG_FORMAT=json`.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,mfe=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Job logger carrying the moment and queue IDs on every event.
#[derive(Debug, Clone)]
pub struct JobLogger {
    moment_id: String,
    queue_id: String,
}

impl JobLogger {
    /// Create a logger for the moment about to be processed.
    pub fn new(moment: &Moment) -> Self {
        Self {
            moment_id: moment.moment_id.to_string(),
            queue_id: moment.queue_id.to_string(),
        }
    }

    /// Log that a job was taken off the queue.
    pub fn log_start(&self) {
        info!(
            moment_id = %self.moment_id,
            queue_id = %self.queue_id,
            "Job started"
        );
    }

    /// Log the start of a pipeline step.
    pub fn log_step_started(&self, step: PipelineStep) {
        info!(
            moment_id = %self.moment_id,
            queue_id = %self.queue_id,
            step = step.as_str(),
            "Step started"
        );
    }

    /// Log a step that completed successfully.
    ///
    /// # Arguments
    /// * `step` - The step that finished
    /// * `elapsed` - Time since the step started, emitted as `elapsed_ms`
    pub fn log_step_finished(&self, step: PipelineStep, elapsed: Duration) {
        info!(
            moment_id = %self.moment_id,
            queue_id = %self.queue_id,
            step = step.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Step finished"
        );
    }

    /// Log a problem that does not fail the job, such as a soft metadata
    /// rejection.
    pub fn log_warning(&self, message: &str) {
        warn!(
            moment_id = %self.moment_id,
            queue_id = %self.queue_id,
            "Job warning: {}", message
        );
    }

    /// Log the error that stopped the job.
    ///
    /// # Arguments
    /// * `step` - The step in flight when the job failed
    /// * `message` - Rendered error
    pub fn log_error(&self, step: PipelineStep, message: &str) {
        error!(
            moment_id = %self.moment_id,
            queue_id = %self.queue_id,
            step = step.as_str(),
            "Job failed: {}", message
        );
    }

    /// Log a fully published job along with its hosted video ID.
    pub fn log_completion(&self, external_id: &str) {
        info!(
            moment_id = %self.moment_id,
            queue_id = %self.queue_id,
            external_id = %external_id,
            "Job completed"
        );
    }

    /// Moment ID this logger tags events with.
    pub fn moment_id(&self) -> &str {
        &self.moment_id
    }

    /// Upload object key this logger tags events with.
    pub fn queue_id(&self) -> &str {
        &self.queue_id
    }

    /// Span wrapping the whole pipeline run for one moment.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            moment_id = %self.moment_id,
            queue_id = %self.queue_id
        )
    }
}
