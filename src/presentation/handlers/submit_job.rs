use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::services::{JobServiceError, JobSummary};
use crate::presentation::state::AppState;

/// Missing fields deserialize as empty strings so they are reported by the
/// submission rules rather than rejected by the extractor.
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub target_format: String,
    #[serde(default)]
    pub priority: String,
}

#[derive(Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: String,
    pub priority: String,
    pub source_file: String,
    pub target_format: String,
    pub created_at: String,
    pub queued_at: Option<String>,
    pub message: String,
}

impl From<JobSummary> for SubmitJobResponse {
    fn from(summary: JobSummary) -> Self {
        Self {
            job_id: summary.job_id.to_string(),
            status: summary.status.as_str().to_string(),
            priority: summary.priority.as_str().to_string(),
            source_file: summary.source_file,
            target_format: summary.target_format,
            created_at: summary.created_at.to_rfc3339(),
            queued_at: summary.queued_at.map(|t| t.to_rfc3339()),
            message: "Job submitted successfully".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[tracing::instrument(skip(state, request))]
pub async fn submit_job_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> impl IntoResponse {
    // Runs detached: a dropped request must not leave a job between create
    // and enqueue.
    let job_service = Arc::clone(&state.job_service);
    let submission = tokio::spawn(async move {
        job_service
            .submit(
                &request.source_file,
                &request.target_format,
                &request.priority,
            )
            .await
    })
    .await;

    let result = match submission {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Job submission task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to submit job".to_string(),
                    details: None,
                }),
            )
                .into_response();
        }
    };

    match result {
        Ok(summary) => (StatusCode::CREATED, Json(SubmitJobResponse::from(summary))).into_response(),
        Err(JobServiceError::Validation(e)) => {
            tracing::warn!(error = %e, "Job submission rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    details: Some(serde_json::json!({ e.field(): [e.to_string()] })),
                }),
            )
                .into_response()
        }
        Err(JobServiceError::Dispatch(e)) => {
            tracing::warn!(error = %e, "Job queue unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: format!("Job queue unavailable: {}", e),
                    details: None,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Job submission failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to submit job: {}", e),
                    details: None,
                }),
            )
                .into_response()
        }
    }
}
