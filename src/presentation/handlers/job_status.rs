use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{JobServiceError, JobStatusView};
use crate::domain::{JobId, JobMetrics};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub source_file: String,
    pub target_format: String,
    pub priority: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: String,
    pub queued_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub metrics: Option<MetricsResponse>,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub peak_cpu_usage: i32,
    pub memory_usage_mb: i32,
    pub processing_time_seconds: f64,
}

impl From<JobMetrics> for MetricsResponse {
    fn from(metrics: JobMetrics) -> Self {
        Self {
            peak_cpu_usage: metrics.peak_cpu_usage,
            memory_usage_mb: metrics.memory_usage_mb,
            processing_time_seconds: metrics.processing_time_seconds,
        }
    }
}

impl From<JobStatusView> for JobStatusResponse {
    fn from(view: JobStatusView) -> Self {
        let job = view.job;
        Self {
            id: job.id.to_string(),
            source_file: job.source_file,
            target_format: job.target_format,
            priority: job.priority.as_str().to_string(),
            status: job.status.as_str().to_string(),
            error_message: job.error_message,
            created_at: job.created_at.to_rfc3339(),
            queued_at: job.queued_at.map(|t| t.to_rfc3339()),
            started_at: job.started_at.map(|t| t.to_rfc3339()),
            completed_at: job.completed_at.map(|t| t.to_rfc3339()),
            metrics: view.metrics.map(MetricsResponse::from),
        }
    }
}

#[derive(Serialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub job_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(job_id: String) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Job not found".to_string(),
            job_id,
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    // An id that is not a UUID can never have been issued.
    let Ok(uuid) = Uuid::parse_str(&job_id) else {
        return not_found(job_id);
    };

    match state.job_service.get_status(JobId::from_uuid(uuid)).await {
        Ok(view) => (StatusCode::OK, Json(JobStatusResponse::from(view))).into_response(),
        Err(JobServiceError::NotFound(_)) => not_found(job_id),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch job: {}", e),
                }),
            )
                .into_response()
        }
    }
}
