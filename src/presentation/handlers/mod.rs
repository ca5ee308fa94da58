mod health;
mod job_status;
mod submit_job;

pub use health::health_handler;
pub use job_status::{JobStatusResponse, MetricsResponse, job_status_handler};
pub use submit_job::{SubmitJobRequest, SubmitJobResponse, submit_job_handler};
