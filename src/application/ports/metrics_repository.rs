use crate::domain::{JobId, JobMetrics};
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Fails with `ConstraintViolation` when metrics for the job already exist.
    async fn insert(&self, metrics: &JobMetrics) -> Result<(), RepositoryError>;

    async fn get_by_job_id(&self, job_id: JobId) -> Result<Option<JobMetrics>, RepositoryError>;
}
