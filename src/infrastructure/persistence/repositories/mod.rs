mod in_memory_repository;
mod pg_job_repository;
mod pg_metrics_repository;

pub use in_memory_repository::{InMemoryJobRepository, InMemoryMetricsRepository};
pub use pg_job_repository::PgJobRepository;
pub use pg_metrics_repository::PgMetricsRepository;
