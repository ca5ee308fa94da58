use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, MetricsRepository, RepositoryError};
use crate::domain::{Job, JobId, JobMetrics, JobStatus};

/// Process-local job store. The write lock makes each conditional update an
/// atomic read-modify-write, matching the row-level guarantee of Postgres.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops a record, as an operator deleting a row would.
    pub async fn remove(&self, id: JobId) -> Option<Job> {
        self.jobs.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn insert(&self, job: &Job) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn update(&self, job: &Job, expected: JobStatus) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let stored = jobs
            .get_mut(&job.id)
            .ok_or_else(|| RepositoryError::NotFound(job.id.to_string()))?;

        if stored.status != expected {
            return Err(RepositoryError::Conflict(format!(
                "job {} is {}, expected {}",
                job.id, stored.status, expected
            )));
        }

        *stored = job.clone();
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.status == status)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }
}

#[derive(Default)]
pub struct InMemoryMetricsRepository {
    metrics: RwLock<HashMap<JobId, JobMetrics>>,
}

impl InMemoryMetricsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MetricsRepository for InMemoryMetricsRepository {
    async fn insert(&self, metrics: &JobMetrics) -> Result<(), RepositoryError> {
        let mut stored = self.metrics.write().await;
        if stored.contains_key(&metrics.job_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "metrics already recorded for job {}",
                metrics.job_id
            )));
        }
        stored.insert(metrics.job_id, metrics.clone());
        Ok(())
    }

    async fn get_by_job_id(&self, job_id: JobId) -> Result<Option<JobMetrics>, RepositoryError> {
        Ok(self.metrics.read().await.get(&job_id).cloned())
    }
}
