//! Worker metrics.
//!
//! Records through the `metrics` facade; no exporter is installed by the
//! worker itself, so these are no-ops unless the host process adds a recorder.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::processor::PipelineStep;

// =============================================================================
// Metric Names
// =============================================================================

pub mod names {
    /// Finished jobs by outcome.
    pub const JOBS_TOTAL: &str = "mfe_jobs_total";

    /// Pipeline step executions by step and outcome.
    pub const STEPS_TOTAL: &str = "mfe_pipeline_steps_total";

    /// Step latency in seconds by step.
    pub const STEP_SECONDS: &str = "mfe_pipeline_step_seconds";

    /// Queue fetches by result (`jobs`, `empty`, `error`).
    pub const FETCHES_TOTAL: &str = "mfe_queue_fetches_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Count a finished job.
///
/// `outcome` is `succeeded` or `failed`.
pub fn record_job(outcome: &'static str) {
    counter!(names::JOBS_TOTAL, "outcome" => outcome).increment(1);
}

/// Count one step execution and record its latency.
///
/// # Arguments
/// * `step` - Pipeline step, used as the `step` label
/// * `outcome` - `succeeded` or `failed`
/// * `elapsed` - Step duration, recorded in seconds
pub fn record_step(step: PipelineStep, outcome: &'static str, elapsed: Duration) {
    counter!(
        names::STEPS_TOTAL,
        "step" => step.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(names::STEP_SECONDS, "step" => step.as_str()).record(elapsed.as_secs_f64());
}

/// Count a queue receive call by its result.
pub fn record_fetch(result: &'static str) {
    counter!(names::FETCHES_TOTAL, "result" => result).increment(1);
}
