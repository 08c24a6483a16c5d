//! Queue drain loop.

use tracing::{info, warn};

use mfe_queue::QueueMessage;

use crate::context::WorkerContext;
use crate::escalation::Escalation;
use crate::metrics;
use crate::processor::JobProcessor;

/// The queue counts as drained only when a fetch came back empty and the
/// queue also reports no visible messages.
pub fn is_drained(batch_len: usize, approximate_depth: u64) -> bool {
    batch_len == 0 && approximate_depth == 0
}

/// Counters for a completed drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Receive calls issued
    pub fetches: u64,
    /// Jobs that ran every step
    pub jobs_processed: u64,
    /// Empty fetches that were followed by a non-zero depth reading
    pub retries: u64,
}

/// Fetches batches and runs each job until the queue is drained.
pub struct Drainer<'a> {
    ctx: &'a WorkerContext,
    processor: JobProcessor<'a>,
}

impl<'a> Drainer<'a> {
    pub fn new(ctx: &'a WorkerContext) -> Self {
        Self {
            ctx,
            processor: JobProcessor::new(ctx),
        }
    }

    /// Drain the queue. Stops at the first failure of any kind.
    pub async fn run(&self) -> Result<DrainSummary, Escalation> {
        let queue = &self.ctx.services.queue;
        let queue_config = &self.ctx.config.queue;
        let mut summary = DrainSummary::default();

        loop {
            let batch = match queue
                .fetch_batch(queue_config.batch_size, queue_config.wait_time)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    metrics::record_fetch("error");
                    return Err(Escalation::without_job(e.into()));
                }
            };
            summary.fetches += 1;

            if batch.is_empty() {
                metrics::record_fetch("empty");
                let depth = queue
                    .approximate_depth()
                    .await
                    .map_err(|e| Escalation::without_job(e.into()))?;

                if is_drained(batch.len(), depth) {
                    info!(
                        "Queue drained after {} jobs ({} fetches)",
                        summary.jobs_processed, summary.fetches
                    );
                    return Ok(summary);
                }

                info!("Available messages is greater than 0 ({}), retrying", depth);
                summary.retries += 1;
                continue;
            }

            metrics::record_fetch("jobs");
            info!("Fetched {} messages", batch.len());

            for message in batch {
                let job = match message.decode() {
                    Ok(job) => job,
                    Err(e) => {
                        self.discard(message).await;
                        return Err(Escalation::without_job(e.into()));
                    }
                };
                self.processor.process(job).await?;
                summary.jobs_processed += 1;
            }
        }
    }

    /// Remove a message that can never be decoded so it is not redelivered.
    async fn discard(&self, message: QueueMessage) {
        let message_id = message.message_id.clone().unwrap_or_default();
        let Some(handle) = message.into_receipt_handle() else {
            warn!("Malformed message {} has no receipt handle", message_id);
            return;
        };
        if let Err(e) = self.ctx.services.queue.delete_job(handle).await {
            warn!("Failed to delete malformed message {}: {}", message_id, e);
        }
    }
}
