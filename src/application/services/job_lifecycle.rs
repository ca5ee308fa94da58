use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, JobSubmission, TransitionError, ValidationError};

/// The only writer of job records. Every transition reads the current record,
/// validates the move against the lifecycle and writes it back conditionally
/// on the status it observed.
pub struct JobLifecycle {
    job_repository: Arc<dyn JobRepository>,
}

impl JobLifecycle {
    pub fn new(job_repository: Arc<dyn JobRepository>) -> Self {
        Self { job_repository }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        source_file: &str,
        target_format: &str,
        priority: &str,
    ) -> Result<Job, LifecycleError> {
        let submission = JobSubmission::new(source_file, target_format, priority)?;
        let job = Job::new(submission);

        self.job_repository
            .insert(&job)
            .await
            .map_err(LifecycleError::Repository)?;

        tracing::debug!(job_id = %job.id, priority = %job.priority, "Job created");
        Ok(job)
    }

    pub async fn mark_queued(&self, id: JobId) -> Result<Job, LifecycleError> {
        self.apply(id, JobStatus::Queued, |job, now| job.mark_queued(now))
            .await
    }

    pub async fn mark_started(&self, id: JobId) -> Result<Job, LifecycleError> {
        self.apply(id, JobStatus::InProgress, |job, now| job.mark_started(now))
            .await
    }

    pub async fn mark_completed(&self, id: JobId) -> Result<Job, LifecycleError> {
        self.apply(id, JobStatus::Completed, |job, now| job.mark_completed(now))
            .await
    }

    pub async fn mark_failed(&self, id: JobId, message: &str) -> Result<Job, LifecycleError> {
        self.apply(id, JobStatus::Failed, |job, now| job.mark_failed(message, now))
            .await
    }

    async fn apply<F>(&self, id: JobId, to: JobStatus, transition: F) -> Result<Job, LifecycleError>
    where
        F: FnOnce(&mut Job, DateTime<Utc>) -> Result<(), TransitionError>,
    {
        let mut job = self
            .job_repository
            .get_by_id(id)
            .await
            .map_err(LifecycleError::Repository)?
            .ok_or(LifecycleError::NotFound(id))?;

        let from = job.status;
        transition(&mut job, Utc::now())?;

        self.job_repository
            .update(&job, from)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => LifecycleError::NotFound(id),
                RepositoryError::Conflict(_) => LifecycleError::Conflict(id),
                other => LifecycleError::Repository(other),
            })?;

        tracing::debug!(job_id = %id, from = %from, to = %to, "Job status transition");
        Ok(job)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("job {0} was modified concurrently")]
    Conflict(JobId),
    #[error("repository: {0}")]
    Repository(RepositoryError),
}
