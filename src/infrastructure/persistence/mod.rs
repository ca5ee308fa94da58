mod pg_pool;
mod repositories;
mod repository_factory;

pub use repositories::InMemoryJobRepository;
pub use repositories::InMemoryMetricsRepository;
pub use repositories::PgJobRepository;
pub use repositories::PgMetricsRepository;

pub use pg_pool::{create_pool, run_migrations};
pub use repository_factory::{Repositories, RepositoryFactory};
