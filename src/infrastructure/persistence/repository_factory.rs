use std::sync::Arc;

use crate::application::ports::{JobRepository, MetricsRepository, RepositoryError};
use crate::presentation::config::{DatabaseProvider, DatabaseSettings};

use super::pg_pool::{create_pool, run_migrations};
use super::repositories::{
    InMemoryJobRepository, InMemoryMetricsRepository, PgJobRepository, PgMetricsRepository,
};

/// The job store and metrics store backing one process.
#[derive(Clone)]
pub struct Repositories {
    pub jobs: Arc<dyn JobRepository>,
    pub metrics: Arc<dyn MetricsRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            jobs: Arc::new(InMemoryJobRepository::new()),
            metrics: Arc::new(InMemoryMetricsRepository::new()),
        }
    }
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    pub async fn create(settings: &DatabaseSettings) -> Result<Repositories, RepositoryError> {
        match settings.provider {
            DatabaseProvider::Memory => {
                tracing::warn!("Using in-memory job store, state is lost on restart");
                Ok(Repositories::in_memory())
            }
            DatabaseProvider::Postgres => {
                let pool = create_pool(&settings.url, settings.max_connections).await?;
                if settings.run_migrations {
                    run_migrations(&pool).await?;
                }
                Ok(Repositories {
                    jobs: Arc::new(PgJobRepository::new(pool.clone())),
                    metrics: Arc::new(PgMetricsRepository::new(pool)),
                })
            }
        }
    }
}
