use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::application::ports::{Workload, WorkloadError};
use crate::domain::{Job, Priority, ResourceUsage};
use crate::presentation::config::WorkloadSettings;

pub const HIGH_PRIORITY_UNITS: (f64, f64) = (3.0, 5.0);
pub const LOW_PRIORITY_UNITS: (f64, f64) = (5.0, 10.0);
pub const PEAK_CPU_RANGE: (i32, i32) = (45, 95);
pub const MEMORY_MB_RANGE: (i32, i32) = (256, 1024);

/// Stand-in for a media transcode: occupies the worker for a random duration
/// drawn from its priority class's range, then reports sampled resource usage.
#[derive(Debug, Clone)]
pub struct SimulatedWorkload {
    time_unit: Duration,
    high_priority_units: (f64, f64),
    low_priority_units: (f64, f64),
    failure_rate: f64,
}

impl SimulatedWorkload {
    pub fn new(time_unit: Duration) -> Self {
        Self {
            time_unit,
            high_priority_units: HIGH_PRIORITY_UNITS,
            low_priority_units: LOW_PRIORITY_UNITS,
            failure_rate: 0.0,
        }
    }

    pub fn from_settings(settings: &WorkloadSettings) -> Self {
        Self::new(Duration::from_millis(settings.time_unit_ms))
            .with_duration_range(
                Priority::High,
                settings.high_priority.min_units,
                settings.high_priority.max_units,
            )
            .with_duration_range(
                Priority::Low,
                settings.low_priority.min_units,
                settings.low_priority.max_units,
            )
            .with_failure_rate(settings.failure_rate)
    }

    pub fn with_duration_range(mut self, priority: Priority, min_units: f64, max_units: f64) -> Self {
        let min = min_units.max(0.0);
        let range = (min, max_units.max(min));
        match priority {
            Priority::High => self.high_priority_units = range,
            Priority::Low => self.low_priority_units = range,
        }
        self
    }

    /// Fraction of runs, in `[0, 1]`, that end in a simulated failure.
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    pub fn duration_range(&self, priority: Priority) -> (Duration, Duration) {
        let (min, max) = self.units(priority);
        (self.time_unit.mul_f64(min), self.time_unit.mul_f64(max))
    }

    fn units(&self, priority: Priority) -> (f64, f64) {
        match priority {
            Priority::High => self.high_priority_units,
            Priority::Low => self.low_priority_units,
        }
    }

    fn sample_duration(&self, priority: Priority) -> Duration {
        let (min, max) = self.units(priority);
        let units = if max > min {
            rand::rng().random_range(min..=max)
        } else {
            min
        };
        self.time_unit.mul_f64(units)
    }

    fn sample_failure(&self) -> bool {
        self.failure_rate > 0.0 && rand::rng().random_bool(self.failure_rate)
    }
}

impl Default for SimulatedWorkload {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

pub fn sample_usage() -> ResourceUsage {
    let mut rng = rand::rng();
    ResourceUsage {
        peak_cpu_usage: rng.random_range(PEAK_CPU_RANGE.0..=PEAK_CPU_RANGE.1),
        memory_usage_mb: rng.random_range(MEMORY_MB_RANGE.0..=MEMORY_MB_RANGE.1),
    }
}

#[async_trait]
impl Workload for SimulatedWorkload {
    async fn run(&self, job: &Job) -> Result<ResourceUsage, WorkloadError> {
        let duration = self.sample_duration(job.priority);
        let fails = self.sample_failure();

        tracing::debug!(
            duration_ms = duration.as_millis() as u64,
            target_format = %job.target_format,
            "Simulating transcode"
        );
        tokio::time::sleep(duration).await;

        if fails {
            return Err(WorkloadError::Failed(format!(
                "simulated transcode failure: {} -> {}",
                job.source_file, job.target_format
            )));
        }

        Ok(sample_usage())
    }
}
