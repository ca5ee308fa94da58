mod job_repository;
mod metrics_repository;
mod repository_error;
mod workload;

pub use job_repository::JobRepository;
pub use metrics_repository::MetricsRepository;
pub use repository_error::RepositoryError;
pub use workload::{Workload, WorkloadError};
