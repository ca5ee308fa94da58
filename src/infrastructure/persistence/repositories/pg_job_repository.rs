use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus, Priority};

const SELECT_JOB: &str = r#"
    SELECT id, source_file, target_format, priority, status, error_message,
           created_at, queued_at, started_at, completed_at
    FROM jobs
"#;

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    source_file: String,
    target_format: String,
    priority: String,
    status: String,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    queued_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for Job {
    type Error = RepositoryError;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        let status = r
            .status
            .parse::<JobStatus>()
            .map_err(RepositoryError::QueryFailed)?;
        let priority = r
            .priority
            .parse::<Priority>()
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(Job {
            id: JobId::from_uuid(r.id),
            source_file: r.source_file,
            target_format: r.target_format,
            priority,
            status,
            error_message: r.error_message,
            created_at: r.created_at,
            queued_at: r.queued_at,
            started_at: r.started_at,
            completed_at: r.completed_at,
        })
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn insert(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, source_file, target_format, priority, status, error_message,
                              created_at, queued_at, started_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.source_file)
        .bind(&job.target_format)
        .bind(job.priority.as_str())
        .bind(job.status.as_str())
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.queued_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                RepositoryError::ConstraintViolation(format!("job {} already exists", job.id))
            }
            _ => RepositoryError::QueryFailed(e.to_string()),
        })?;

        Ok(())
    }

    #[instrument(skip(self, job, expected), fields(job_id = %job.id, status = %job.status, expected = %expected))]
    async fn update(&self, job: &Job, expected: JobStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $1, error_message = $2, queued_at = $3, started_at = $4, completed_at = $5
            WHERE id = $6 AND status = $7
            "#,
        )
        .bind(job.status.as_str())
        .bind(&job.error_message)
        .bind(job.queued_at)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.id.as_uuid())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1)")
            .bind(job.id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if exists {
            Err(RepositoryError::Conflict(format!(
                "job {} is no longer {}",
                job.id, expected
            )))
        } else {
            Err(RepositoryError::NotFound(job.id.to_string()))
        }
    }

    #[instrument(skip(self, id), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query_as::<_, JobRow>(&format!("{SELECT_JOB} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(Job::try_from).transpose()
    }

    #[instrument(skip(self, status), fields(status = %status))]
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "{SELECT_JOB} WHERE status = $1 ORDER BY created_at ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(Job::try_from).collect()
    }
}
