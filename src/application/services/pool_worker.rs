use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, mpsc};
use tracing::Instrument;

use super::LifecycleError;
use super::dispatcher::PoolContext;
use crate::application::ports::WorkloadError;
use crate::domain::{Job, JobId, JobMetrics, ResourceUsage};

/// One slot of a pool. Stateless between jobs: it owns a job only from the
/// moment it dequeues the id until the job reaches a terminal state.
pub(super) struct PoolWorker {
    pub receiver: Arc<Mutex<mpsc::Receiver<JobId>>>,
    pub in_flight: Arc<AtomicUsize>,
    pub context: PoolContext,
}

impl PoolWorker {
    pub async fn run(self) {
        tracing::info!("Pool worker started");
        loop {
            let next = tokio::select! {
                biased;
                _ = self.context.shutdown.cancelled() => None,
                job_id = self.next_job() => job_id,
            };

            let Some(job_id) = next else {
                break;
            };

            let span = tracing::info_span!("job", job_id = %job_id);
            self.process(job_id).instrument(span).await;
        }
        tracing::info!("Pool worker stopped");
    }

    async fn next_job(&self) -> Option<JobId> {
        self.receiver.lock().await.recv().await
    }

    async fn process(&self, job_id: JobId) {
        let job = match self.context.lifecycle.mark_started(job_id).await {
            Ok(job) => job,
            Err(e) => {
                self.handle_lifecycle_error(job_id, e).await;
                return;
            }
        };

        let _in_flight = InFlight::enter(&self.in_flight);
        tracing::info!(
            source_file = %job.source_file,
            target_format = %job.target_format,
            priority = %job.priority,
            "Job started"
        );

        let started = Instant::now();
        match self.execute(&job).await {
            Ok(usage) => self.complete(job_id, usage, started.elapsed()).await,
            Err(e) => self.fail(job_id, &e.to_string()).await,
        }
    }

    // The workload runs on its own task so a panic costs the job, not the slot.
    async fn execute(&self, job: &Job) -> Result<ResourceUsage, WorkloadError> {
        let workload = Arc::clone(&self.context.workload);
        let job = job.clone();

        tokio::spawn(async move { workload.run(&job).await })
            .await
            .unwrap_or_else(|e| Err(WorkloadError::Panicked(e.to_string())))
    }

    async fn complete(&self, job_id: JobId, usage: ResourceUsage, elapsed: Duration) {
        if let Err(e) = self.context.lifecycle.mark_completed(job_id).await {
            self.handle_lifecycle_error(job_id, e).await;
            return;
        }

        // Not atomic with the transition above; a failure here leaves a
        // COMPLETED job without metrics.
        let metrics = JobMetrics::record(job_id, usage, elapsed);
        match self.context.metrics_repository.insert(&metrics).await {
            Ok(()) => tracing::info!(
                processing_time_seconds = metrics.processing_time_seconds,
                peak_cpu_usage = metrics.peak_cpu_usage,
                memory_usage_mb = metrics.memory_usage_mb,
                "Job completed"
            ),
            Err(e) => tracing::error!(error = %e, "Job completed but metrics were not stored"),
        }
    }

    async fn handle_lifecycle_error(&self, job_id: JobId, error: LifecycleError) {
        match error {
            LifecycleError::NotFound(_) => {
                tracing::warn!("Job vanished from the store, abandoning");
            }
            LifecycleError::InvalidTransition(e) if e.from.is_terminal() => {
                tracing::info!(status = %e.from, "Job already terminal, discarding");
            }
            other => {
                tracing::error!(error = %other, "Job transition failed");
                self.fail(job_id, &other.to_string()).await;
            }
        }
    }

    async fn fail(&self, job_id: JobId, message: &str) {
        match self.context.lifecycle.mark_failed(job_id, message).await {
            Ok(_) => tracing::warn!(error = %message, "Job failed"),
            Err(LifecycleError::NotFound(_)) => {
                tracing::warn!("Job vanished from the store before failure was recorded");
            }
            Err(LifecycleError::InvalidTransition(e)) => {
                tracing::debug!(status = %e.from, "Job already terminal, failure not recorded");
            }
            Err(e) => tracing::error!(
                error = %e,
                "Could not record job failure, job left in its last recorded state"
            ),
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
