use crate::domain::{Job, JobId, JobStatus};
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: &Job) -> Result<(), RepositoryError>;

    /// Replaces the stored record with `job`, but only while the stored status
    /// still equals `expected`. Returns `Conflict` when another writer got
    /// there first and `NotFound` when the record is gone.
    async fn update(&self, job: &Job, expected: JobStatus) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// Jobs in `status`, oldest first.
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;
}
