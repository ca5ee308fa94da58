use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{DispatchError, Dispatcher, JobLifecycle, LifecycleError};
use crate::application::ports::{JobRepository, MetricsRepository, RepositoryError};
use crate::domain::{Job, JobId, JobMetrics, JobStatus, Priority, ValidationError};

const INTERRUPTED_BEFORE_QUEUEING: &str = "submission interrupted before queueing";
const INTERRUPTED_WHILE_RUNNING: &str = "worker interrupted before completion";

/// What a caller gets back from a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub job_id: JobId,
    pub status: JobStatus,
    pub priority: Priority,
    pub source_file: String,
    pub target_format: String,
    pub created_at: DateTime<Utc>,
    pub queued_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            priority: job.priority,
            source_file: job.source_file.clone(),
            target_format: job.target_format.clone(),
            created_at: job.created_at,
            queued_at: job.queued_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusView {
    pub job: Job,
    pub metrics: Option<JobMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub requeued: usize,
    pub failed: usize,
}

/// Submission and query entry point. Owns a job only until it is enqueued;
/// after that it just reads.
pub struct JobService {
    lifecycle: Arc<JobLifecycle>,
    job_repository: Arc<dyn JobRepository>,
    metrics_repository: Arc<dyn MetricsRepository>,
    dispatcher: Arc<Dispatcher>,
}

impl JobService {
    pub fn new(
        lifecycle: Arc<JobLifecycle>,
        job_repository: Arc<dyn JobRepository>,
        metrics_repository: Arc<dyn MetricsRepository>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            lifecycle,
            job_repository,
            metrics_repository,
            dispatcher,
        }
    }

    pub async fn submit(
        &self,
        source_file: &str,
        target_format: &str,
        priority: &str,
    ) -> Result<JobSummary, JobServiceError> {
        let job = self
            .lifecycle
            .create(source_file, target_format, priority)
            .await?;
        let job = self.lifecycle.mark_queued(job.id).await?;

        let route = match self.dispatcher.enqueue(&job) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "Job could not be enqueued");
                if let Err(fail_err) = self.lifecycle.mark_failed(job.id, &e.to_string()).await {
                    tracing::error!(job_id = %job.id, error = %fail_err, "Failed to mark rejected job");
                }
                return Err(JobServiceError::Dispatch(e));
            }
        };

        tracing::info!(
            job_id = %job.id,
            priority = %job.priority,
            queue = %route.queue,
            source_file = %job.source_file,
            "Job submitted"
        );

        Ok(JobSummary::from(&job))
    }

    pub async fn get_status(&self, id: JobId) -> Result<JobStatusView, JobServiceError> {
        let job = self
            .job_repository
            .get_by_id(id)
            .await?
            .ok_or(JobServiceError::NotFound(id))?;

        let metrics = self.metrics_repository.get_by_job_id(id).await?;

        Ok(JobStatusView { job, metrics })
    }

    /// Reconciles jobs left behind by a previous process. QUEUED jobs go back
    /// on their queue in creation order; jobs caught mid-submission or
    /// mid-run are failed, since nothing is retried automatically.
    ///
    /// Must run after the pools start and before submissions are accepted.
    pub async fn recover(&self) -> Result<RecoveryReport, JobServiceError> {
        let mut report = RecoveryReport::default();

        for job in self.job_repository.list_by_status(JobStatus::Pending).await? {
            self.fail_stale(job.id, INTERRUPTED_BEFORE_QUEUEING, &mut report)
                .await;
        }

        for job in self
            .job_repository
            .list_by_status(JobStatus::InProgress)
            .await?
        {
            self.fail_stale(job.id, INTERRUPTED_WHILE_RUNNING, &mut report)
                .await;
        }

        for job in self.job_repository.list_by_status(JobStatus::Queued).await? {
            match self.dispatcher.enqueue(&job) {
                Ok(_) => report.requeued += 1,
                Err(e) => self.fail_stale(job.id, &e.to_string(), &mut report).await,
            }
        }

        tracing::info!(
            requeued = report.requeued,
            failed = report.failed,
            "Job recovery finished"
        );
        Ok(report)
    }

    async fn fail_stale(&self, id: JobId, reason: &str, report: &mut RecoveryReport) {
        match self.lifecycle.mark_failed(id, reason).await {
            Ok(_) => {
                tracing::warn!(job_id = %id, reason, "Stale job failed");
                report.failed += 1;
            }
            Err(e) => tracing::warn!(job_id = %id, error = %e, "Could not fail stale job"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error(transparent)]
    Validation(ValidationError),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Lifecycle(LifecycleError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<LifecycleError> for JobServiceError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::Validation(e) => JobServiceError::Validation(e),
            LifecycleError::NotFound(id) => JobServiceError::NotFound(id),
            other => JobServiceError::Lifecycle(other),
        }
    }
}
