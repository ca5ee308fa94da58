use async_trait::async_trait;

use crate::domain::{Job, ResourceUsage};

/// The unit of work a pool worker executes for one job.
#[async_trait]
pub trait Workload: Send + Sync {
    async fn run(&self, job: &Job) -> Result<ResourceUsage, WorkloadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    #[error("{0}")]
    Failed(String),
    #[error("workload panicked: {0}")]
    Panicked(String),
}
