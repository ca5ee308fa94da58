mod job;
mod job_id;
mod job_metrics;
mod job_status;
mod job_submission;
mod priority;
mod validation_error;

pub use job::{Job, TransitionError};
pub use job_id::JobId;
pub use job_metrics::{JobMetrics, ResourceUsage};
pub use job_status::JobStatus;
pub use job_submission::{JobSubmission, MAX_SOURCE_FILE_LEN, MAX_TARGET_FORMAT_LEN};
pub use priority::Priority;
pub use validation_error::ValidationError;
