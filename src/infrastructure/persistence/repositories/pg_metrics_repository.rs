use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{MetricsRepository, RepositoryError};
use crate::domain::{JobId, JobMetrics};

pub struct PgMetricsRepository {
    pool: PgPool,
}

impl PgMetricsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MetricsRow {
    job_id: Uuid,
    peak_cpu_usage: i32,
    memory_usage_mb: i32,
    processing_time_seconds: f64,
    created_at: DateTime<Utc>,
}

impl From<MetricsRow> for JobMetrics {
    fn from(r: MetricsRow) -> Self {
        Self {
            job_id: JobId::from_uuid(r.job_id),
            peak_cpu_usage: r.peak_cpu_usage,
            memory_usage_mb: r.memory_usage_mb,
            processing_time_seconds: r.processing_time_seconds,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl MetricsRepository for PgMetricsRepository {
    #[instrument(skip(self, metrics), fields(job_id = %metrics.job_id))]
    async fn insert(&self, metrics: &JobMetrics) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO job_metrics (id, job_id, peak_cpu_usage, memory_usage_mb,
                                     processing_time_seconds, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(metrics.job_id.as_uuid())
        .bind(metrics.peak_cpu_usage)
        .bind(metrics.memory_usage_mb)
        .bind(metrics.processing_time_seconds)
        .bind(metrics.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => RepositoryError::ConstraintViolation(format!(
                "metrics already recorded for job {}",
                metrics.job_id
            )),
            Some(db) if db.is_foreign_key_violation() => {
                RepositoryError::NotFound(metrics.job_id.to_string())
            }
            _ => RepositoryError::QueryFailed(e.to_string()),
        })?;

        Ok(())
    }

    #[instrument(skip(self, job_id), fields(job_id = %job_id))]
    async fn get_by_job_id(&self, job_id: JobId) -> Result<Option<JobMetrics>, RepositoryError> {
        let row = sqlx::query_as::<_, MetricsRow>(
            r#"
            SELECT job_id, peak_cpu_usage, memory_usage_mb, processing_time_seconds, created_at
            FROM job_metrics
            WHERE job_id = $1
            "#,
        )
        .bind(job_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(row.map(JobMetrics::from))
    }
}
