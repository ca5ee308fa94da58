use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub pools: Vec<PoolResponse>,
}

#[derive(Serialize)]
pub struct PoolResponse {
    pub queue: String,
    pub capacity: usize,
    pub in_flight: usize,
    pub queued: usize,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let pools = state
        .dispatcher
        .pool_status()
        .into_iter()
        .map(|p| PoolResponse {
            queue: p.queue.as_str().to_string(),
            capacity: p.capacity,
            in_flight: p.in_flight,
            queued: p.queued,
        })
        .collect();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            pools,
        }),
    )
}
