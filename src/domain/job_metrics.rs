use std::time::Duration;

use chrono::{DateTime, Utc};

use super::JobId;

/// Resource figures a workload reports for one successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUsage {
    pub peak_cpu_usage: i32,
    pub memory_usage_mb: i32,
}

/// Write-once usage record, 1:1 with a COMPLETED job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobMetrics {
    pub job_id: JobId,
    pub peak_cpu_usage: i32,
    pub memory_usage_mb: i32,
    pub processing_time_seconds: f64,
    pub created_at: DateTime<Utc>,
}

impl JobMetrics {
    pub fn record(job_id: JobId, usage: ResourceUsage, processing_time: Duration) -> Self {
        let seconds = (processing_time.as_secs_f64() * 100.0).round() / 100.0;
        Self {
            job_id,
            peak_cpu_usage: usage.peak_cpu_usage.clamp(0, 100),
            memory_usage_mb: usage.memory_usage_mb.max(0),
            processing_time_seconds: seconds,
            created_at: Utc::now(),
        }
    }
}
