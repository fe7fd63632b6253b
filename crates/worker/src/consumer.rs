//! Queue consumer — the long-running worker loop.
//!
//! Blocks on the shared new-files queue, decodes each item as a [`Job`],
//! claims the durable dedup marker for its purchase order, and runs the
//! extract → classify → notify pipeline. The loop never dies on a job:
//! malformed payloads are dropped, duplicates are skipped, and every pipeline
//! error is logged with its classification and discarded. Nothing is
//! requeued or retried.

use std::path::PathBuf;
use std::time::Duration;

use redis::aio::ConnectionManager;
use tokio::sync::watch;

use lis_common::error::PipelineError;
use lis_common::types::Job;
use lis_engine::dedup::DedupGuard;
use lis_engine::pipeline::ReleasePipeline;

/// Long-running consumer over the new-files queue.
pub struct QueueConsumer {
    redis: ConnectionManager,
    queue_name: String,
    report_base_dir: PathBuf,
    dedup: DedupGuard,
    pipeline: ReleasePipeline,
}

impl QueueConsumer {
    pub fn new(
        redis: ConnectionManager,
        queue_name: String,
        report_base_dir: PathBuf,
        pipeline: ReleasePipeline,
    ) -> Self {
        Self {
            redis,
            queue_name,
            report_base_dir,
            dedup: DedupGuard::new(),
            pipeline,
        }
    }

    /// Run until the shutdown flag flips.
    ///
    /// Shutdown is cooperative and observed only at the blocking dequeue: a
    /// job already in flight always runs to completion before the loop exits.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        tracing::info!(queue = %self.queue_name, "Queue consumer started");

        loop {
            let payload = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = Self::dequeue(&mut self.redis, &self.queue_name) => match result {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::error!(error = %e, "Dequeue failed, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                },
            };

            self.handle_payload(&payload).await;
        }

        tracing::info!("Queue consumer stopped");
        Ok(())
    }

    /// Blocking dequeue with no timeout — the sole suspension point.
    async fn dequeue(
        redis: &mut ConnectionManager,
        queue_name: &str,
    ) -> Result<String, redis::RedisError> {
        // BLPOP returns (queue name, payload)
        let (_queue, payload): (String, String) = redis::cmd("BLPOP")
            .arg(queue_name)
            .arg(0)
            .query_async(redis)
            .await?;

        Ok(payload)
    }

    /// Handle one dequeued item. Never returns an error — per-job failures
    /// stop at this boundary.
    async fn handle_payload(&mut self, payload: &str) {
        let Some(job) = decode_job(payload) else {
            return;
        };

        let po = job.purchase_order();

        match self.process_job(&job, &po).await {
            Ok(true) => {
                tracing::info!(po = %po, year = %job.year, "Processed release report");
            }
            Ok(false) => {
                // Duplicate — skip already logged.
            }
            Err(e) => {
                tracing::error!(
                    po = %po,
                    year = %job.year,
                    kind = e.kind(),
                    error = %e,
                    "Job failed, discarding"
                );
            }
        }
    }

    /// Claim the dedup marker and run the pipeline. Returns `Ok(false)` when
    /// the PO was already claimed.
    async fn process_job(&mut self, job: &Job, po: &str) -> Result<bool, PipelineError> {
        if !self.dedup.try_claim(&mut self.redis, po).await? {
            tracing::info!(po = %po, year = %job.year, "Skipping duplicate purchase order");
            return Ok(false);
        }

        // The marker is set before processing starts: a crash past this point
        // loses this PO's notifications instead of ever duplicating them.
        let (lots, header) = lis_extractor::extract(&self.report_base_dir, &job.year, po)?;
        self.pipeline.process(&lots, &header).await?;

        Ok(true)
    }
}

/// Decode a queue payload. Anything malformed — bad JSON, missing `year` or
/// `file_name` — is dropped without surfacing an error.
fn decode_job(payload: &str) -> Option<Job> {
    match serde_json::from_str::<Job>(payload) {
        Ok(job) => Some(job),
        Err(e) => {
            tracing::debug!(error = %e, "Dropping undecodable queue item");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_job_well_formed() {
        let job = decode_job(r#"{"year": "2024", "file_name": "E12345.xls"}"#).unwrap();
        assert_eq!(job.year, "2024");
        assert_eq!(job.purchase_order(), "E12345");
    }

    #[test]
    fn test_decode_job_missing_file_name_dropped() {
        assert!(decode_job(r#"{"year": "2024"}"#).is_none());
    }

    #[test]
    fn test_decode_job_invalid_json_dropped() {
        assert!(decode_job("not json").is_none());
        assert!(decode_job("").is_none());
    }

    #[test]
    fn test_decode_job_tolerates_extra_fields() {
        let job = decode_job(r#"{"year": "2024", "file_name": "E1.xls", "source": "watcher"}"#);
        assert!(job.is_some());
    }
}
