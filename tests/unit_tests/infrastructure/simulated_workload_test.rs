use std::time::{Duration, Instant};

use media_processor::application::ports::{Workload, WorkloadError};
use media_processor::domain::{Job, JobSubmission, Priority};
use media_processor::infrastructure::workload::{
    MEMORY_MB_RANGE, PEAK_CPU_RANGE, SimulatedWorkload, sample_usage,
};
use media_processor::presentation::config::{DurationRangeSettings, WorkloadSettings};

fn job(priority: &str) -> Job {
    Job::new(JobSubmission::new("clip.mov", "mkv", priority).unwrap())
}

#[test]
fn given_default_unit_when_reading_ranges_then_high_is_three_to_five_and_low_five_to_ten() {
    let workload = SimulatedWorkload::default();

    assert_eq!(
        workload.duration_range(Priority::High),
        (Duration::from_secs(3), Duration::from_secs(5))
    );
    assert_eq!(
        workload.duration_range(Priority::Low),
        (Duration::from_secs(5), Duration::from_secs(10))
    );
}

#[test]
fn given_inverted_range_when_configuring_then_max_raised_to_min() {
    let workload = SimulatedWorkload::new(Duration::from_secs(1))
        .with_duration_range(Priority::High, 4.0, 2.0);

    assert_eq!(
        workload.duration_range(Priority::High),
        (Duration::from_secs(4), Duration::from_secs(4))
    );
}

#[test]
fn given_settings_when_building_then_ranges_scaled_by_time_unit() {
    let settings = WorkloadSettings {
        time_unit_ms: 1000,
        high_priority: DurationRangeSettings {
            min_units: 1.0,
            max_units: 2.0,
        },
        low_priority: DurationRangeSettings {
            min_units: 3.0,
            max_units: 4.0,
        },
        failure_rate: 0.0,
    };

    let workload = SimulatedWorkload::from_settings(&settings);

    assert_eq!(
        workload.duration_range(Priority::Low),
        (Duration::from_secs(3), Duration::from_secs(4))
    );
}

#[test]
fn given_many_samples_when_sampling_usage_then_within_bounds() {
    for _ in 0..500 {
        let usage = sample_usage();
        assert!((PEAK_CPU_RANGE.0..=PEAK_CPU_RANGE.1).contains(&usage.peak_cpu_usage));
        assert!((MEMORY_MB_RANGE.0..=MEMORY_MB_RANGE.1).contains(&usage.memory_usage_mb));
    }
}

#[tokio::test]
async fn given_high_priority_job_when_running_then_takes_at_least_minimum_duration() {
    let workload = SimulatedWorkload::new(Duration::from_millis(5));
    let started = Instant::now();

    let usage = workload.run(&job("high")).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(14));
    assert!((PEAK_CPU_RANGE.0..=PEAK_CPU_RANGE.1).contains(&usage.peak_cpu_usage));
}

#[tokio::test]
async fn given_failure_rate_of_one_when_running_then_fails_naming_the_job() {
    let workload = SimulatedWorkload::new(Duration::from_millis(1)).with_failure_rate(1.0);

    let err = workload.run(&job("low")).await.unwrap_err();

    match err {
        WorkloadError::Failed(detail) => {
            assert_eq!(detail, "simulated transcode failure: clip.mov -> mkv")
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
