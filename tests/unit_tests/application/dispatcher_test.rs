use std::sync::Arc;
use std::time::Duration;

use media_processor::application::ports::{JobRepository, MetricsRepository};
use media_processor::application::services::{
    DispatchError, JobServiceError, QueueName,
};
use media_processor::domain::{JobStatus, Priority};
use media_processor::infrastructure::persistence::InMemoryJobRepository;
use tokio::sync::Semaphore;

use crate::support::{
    FlakyJobRepository, HarnessBuilder, ScriptedWorkload, USAGE, UnavailableMetricsRepository,
};

async fn wait_until_idle(harness: &crate::support::Harness, queue: QueueName) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while harness.dispatcher.in_flight(queue) > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pool did not go idle in time");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_burst_of_jobs_when_dispatching_then_concurrency_capped_per_pool() {
    let workload = Arc::new(ScriptedWorkload::new(Duration::from_millis(150)));
    let harness = HarnessBuilder::new().start(workload.clone());

    let mut ids = Vec::new();
    for i in 0..10 {
        ids.push(harness.service.submit(&format!("hi-{i}.mov"), "mkv", "high").await.unwrap().job_id);
        ids.push(harness.service.submit(&format!("lo-{i}.mov"), "mkv", "low").await.unwrap().job_id);
    }
    for id in ids {
        assert_eq!(harness.wait_for_terminal(id).await.job.status, JobStatus::Completed);
    }

    assert_eq!(workload.peak(Priority::High), 4);
    assert_eq!(workload.peak(Priority::Low), 2);
    harness.stop().await;
}

#[tokio::test]
async fn given_single_worker_pool_when_dispatching_then_jobs_start_in_submission_order() {
    let workload = Arc::new(ScriptedWorkload::new(Duration::from_millis(5)));
    let harness = HarnessBuilder::new().pools(1, 1).start(workload.clone());

    let mut last = None;
    for name in ["a.mov", "b.mov", "c.mov", "d.mov"] {
        last = Some(harness.service.submit(name, "mkv", "low").await.unwrap().job_id);
    }
    harness.wait_for_terminal(last.unwrap()).await;

    assert_eq!(workload.started(), vec!["a.mov", "b.mov", "c.mov", "d.mov"]);
    harness.stop().await;
}

#[tokio::test]
async fn given_workload_failure_when_processing_then_failed_with_detail_and_no_metrics() {
    let harness = HarnessBuilder::new().start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));

    let summary = harness
        .service
        .submit("fail:unsupported codec h266", "mkv", "high")
        .await
        .unwrap();
    let view = harness.wait_for_terminal(summary.job_id).await;

    assert_eq!(view.job.status, JobStatus::Failed);
    assert_eq!(view.job.error_message.as_deref(), Some("unsupported codec h266"));
    assert!(view.job.started_at.is_some());
    assert!(view.metrics.is_none());
    harness.stop().await;
}

#[tokio::test]
async fn given_successful_workload_when_processing_then_single_metrics_record() {
    let harness = HarnessBuilder::new().start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));

    let summary = harness.service.submit("clip.mov", "mkv", "low").await.unwrap();
    let view = harness.wait_for_terminal(summary.job_id).await;

    assert_eq!(view.job.status, JobStatus::Completed);
    let metrics = view.metrics.expect("completed job carries metrics");
    assert_eq!(metrics.job_id, summary.job_id);
    assert_eq!(metrics.peak_cpu_usage, USAGE.peak_cpu_usage);
    assert_eq!(metrics.memory_usage_mb, USAGE.memory_usage_mb);
    assert!(metrics.processing_time_seconds >= 0.0);
    harness.stop().await;
}

#[tokio::test]
async fn given_panicking_workload_when_processing_then_job_failed_and_slot_survives() {
    let harness = HarnessBuilder::new()
        .pools(1, 1)
        .start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));

    let crashed = harness.service.submit("panic", "mkv", "high").await.unwrap();
    let view = harness.wait_for_terminal(crashed.job_id).await;
    assert_eq!(view.job.status, JobStatus::Failed);
    assert!(view.job.error_message.unwrap().contains("panicked"));

    let next = harness.service.submit("clip.mov", "mkv", "high").await.unwrap();
    let view = harness.wait_for_terminal(next.job_id).await;
    assert_eq!(view.job.status, JobStatus::Completed);
    harness.stop().await;
}

#[tokio::test]
async fn given_job_deleted_while_queued_when_dequeued_then_abandoned_and_worker_continues() {
    let gate = Arc::new(Semaphore::new(0));
    let repository = Arc::new(InMemoryJobRepository::new());
    let jobs: Arc<dyn JobRepository> = repository.clone();
    let harness = HarnessBuilder::new()
        .jobs(jobs)
        .pools(1, 1)
        .start(Arc::new(ScriptedWorkload::gated(gate.clone())));

    let blocker = harness.service.submit("blocker.mov", "mkv", "low").await.unwrap();
    harness.wait_for_status(blocker.job_id, JobStatus::InProgress).await;
    let doomed = harness.service.submit("doomed.mov", "mkv", "low").await.unwrap();
    repository.remove(doomed.job_id).await.unwrap();
    let survivor = harness.service.submit("survivor.mov", "mkv", "low").await.unwrap();

    gate.add_permits(2);

    assert_eq!(
        harness.wait_for_terminal(survivor.job_id).await.job.status,
        JobStatus::Completed
    );
    assert!(repository.get_by_id(doomed.job_id).await.unwrap().is_none());
    assert_eq!(harness.metrics.get_by_job_id(doomed.job_id).await.unwrap(), None);
    harness.stop().await;
}

#[tokio::test]
async fn given_job_failed_externally_while_running_when_workload_finishes_then_failure_stands() {
    let gate = Arc::new(Semaphore::new(0));
    let harness = HarnessBuilder::new().start(Arc::new(ScriptedWorkload::gated(gate.clone())));

    let summary = harness.service.submit("clip.mov", "mkv", "high").await.unwrap();
    harness.wait_for_status(summary.job_id, JobStatus::InProgress).await;
    harness
        .lifecycle
        .mark_failed(summary.job_id, "cancelled by operator")
        .await
        .unwrap();

    gate.add_permits(1);
    wait_until_idle(&harness, QueueName::HighPriority).await;

    let view = harness.service.get_status(summary.job_id).await.unwrap();
    assert_eq!(view.job.status, JobStatus::Failed);
    assert_eq!(view.job.error_message.as_deref(), Some("cancelled by operator"));
    assert!(view.metrics.is_none());
    harness.stop().await;
}

#[tokio::test]
async fn given_metrics_store_down_when_job_completes_then_completed_without_metrics() {
    let metrics: Arc<dyn MetricsRepository> = Arc::new(UnavailableMetricsRepository);
    let harness = HarnessBuilder::new()
        .metrics(metrics)
        .start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));

    let summary = harness.service.submit("clip.mov", "mkv", "low").await.unwrap();
    let view = harness.wait_for_terminal(summary.job_id).await;

    assert_eq!(view.job.status, JobStatus::Completed);
    assert!(view.job.error_message.is_none());
    assert!(view.metrics.is_none());
    harness.stop().await;
}

#[tokio::test]
async fn given_full_queue_when_submitting_then_rejected_and_job_failed() {
    let gate = Arc::new(Semaphore::new(0));
    let harness = HarnessBuilder::new()
        .pools(1, 1)
        .queue_capacity(1)
        .start(Arc::new(ScriptedWorkload::gated(gate.clone())));

    let running = harness.service.submit("running.mov", "mkv", "high").await.unwrap();
    harness.wait_for_status(running.job_id, JobStatus::InProgress).await;
    harness.service.submit("waiting.mov", "mkv", "high").await.unwrap();

    let err = harness
        .service
        .submit("overflow.mov", "mkv", "high")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        JobServiceError::Dispatch(DispatchError::QueueFull(QueueName::HighPriority))
    ));

    let failed = harness
        .jobs
        .list_by_status(JobStatus::Failed)
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].source_file, "overflow.mov");
    assert_eq!(
        failed[0].error_message.as_deref(),
        Some("high_priority queue is full")
    );

    let low = harness.service.submit("other.mov", "mkv", "low").await;
    assert!(low.is_ok(), "the low queue is unaffected by the full high queue");

    gate.add_permits(3);
    harness.stop().await;
}

#[tokio::test]
async fn given_queued_and_running_jobs_when_reporting_pool_status_then_counts_match() {
    let gate = Arc::new(Semaphore::new(0));
    let harness = HarnessBuilder::new()
        .pools(1, 2)
        .start(Arc::new(ScriptedWorkload::gated(gate.clone())));

    let running = harness.service.submit("a.mov", "mkv", "high").await.unwrap();
    harness.wait_for_status(running.job_id, JobStatus::InProgress).await;
    harness.service.submit("b.mov", "mkv", "high").await.unwrap();
    harness.service.submit("c.mov", "mkv", "high").await.unwrap();

    let status = harness.dispatcher.pool_status();
    let high = status.iter().find(|p| p.queue == QueueName::HighPriority).unwrap();
    let low = status.iter().find(|p| p.queue == QueueName::LowPriority).unwrap();
    assert_eq!((high.capacity, high.in_flight, high.queued), (1, 1, 2));
    assert_eq!((low.capacity, low.in_flight, low.queued), (2, 0, 0));

    gate.add_permits(3);
    harness.stop().await;
}

#[tokio::test]
async fn given_idle_pools_when_shutdown_requested_then_all_workers_exit() {
    let harness = HarnessBuilder::new().start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));
    assert_eq!(harness.workers.worker_count(), 6);

    tokio::time::timeout(Duration::from_secs(5), harness.stop())
        .await
        .expect("workers did not stop");
}

#[tokio::test]
async fn given_busy_worker_when_shutdown_requested_then_current_job_finishes() {
    let gate = Arc::new(Semaphore::new(0));
    let harness = HarnessBuilder::new().start(Arc::new(ScriptedWorkload::gated(gate.clone())));

    let summary = harness.service.submit("clip.mov", "mkv", "high").await.unwrap();
    harness.wait_for_status(summary.job_id, JobStatus::InProgress).await;

    harness.shutdown.cancel();
    gate.add_permits(1);
    let jobs = Arc::clone(&harness.jobs);
    tokio::time::timeout(Duration::from_secs(5), harness.workers.wait_for_shutdown())
        .await
        .expect("workers did not stop");

    let job = jobs.get_by_id(summary.job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn given_pending_job_on_queue_when_dequeued_then_force_failed_as_invalid_transition() {
    let harness = HarnessBuilder::new().start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));

    let job = harness.lifecycle.create("clip.mov", "mkv", "high").await.unwrap();
    harness.dispatcher.enqueue(&job).unwrap();
    let view = harness.wait_for_terminal(job.id).await;

    assert_eq!(view.job.status, JobStatus::Failed);
    assert_eq!(
        view.job.error_message.as_deref(),
        Some("invalid transition from PENDING to IN_PROGRESS")
    );
    assert!(view.job.started_at.is_none());
    assert!(view.metrics.is_none());
    harness.stop().await;
}

#[tokio::test]
async fn given_store_rejects_start_when_dequeued_then_job_failed_without_running() {
    let repository = Arc::new(FlakyJobRepository::rejecting(&[JobStatus::InProgress]));
    let jobs: Arc<dyn JobRepository> = repository.clone();
    let workload = Arc::new(ScriptedWorkload::new(Duration::ZERO));
    let harness = HarnessBuilder::new().jobs(jobs).start(workload.clone());

    let summary = harness.service.submit("clip.mov", "mkv", "low").await.unwrap();
    let view = harness.wait_for_terminal(summary.job_id).await;

    assert_eq!(view.job.status, JobStatus::Failed);
    assert!(view.job.error_message.unwrap().contains("write timed out"));
    assert!(view.job.started_at.is_none());
    assert_eq!(repository.rejected(), 1);
    assert!(workload.started().is_empty());
    harness.stop().await;
}

#[tokio::test]
async fn given_store_rejects_completion_when_workload_succeeds_then_job_failed_without_metrics() {
    let repository = Arc::new(FlakyJobRepository::rejecting(&[JobStatus::Completed]));
    let jobs: Arc<dyn JobRepository> = repository.clone();
    let harness = HarnessBuilder::new()
        .jobs(jobs)
        .start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));

    let summary = harness.service.submit("clip.mov", "mkv", "high").await.unwrap();
    let view = harness.wait_for_terminal(summary.job_id).await;

    assert_eq!(view.job.status, JobStatus::Failed);
    assert!(view.job.error_message.unwrap().contains("write timed out"));
    assert!(view.job.started_at.is_some());
    assert!(view.metrics.is_none());
    harness.stop().await;
}

#[tokio::test]
async fn given_store_rejects_completion_and_failure_when_workload_succeeds_then_job_left_in_progress() {
    let repository = Arc::new(FlakyJobRepository::rejecting(&[
        JobStatus::Completed,
        JobStatus::Failed,
    ]));
    let jobs: Arc<dyn JobRepository> = repository.clone();
    let harness = HarnessBuilder::new()
        .jobs(jobs)
        .start(Arc::new(ScriptedWorkload::new(Duration::ZERO)));

    let summary = harness.service.submit("clip.mov", "mkv", "high").await.unwrap();
    tokio::time::timeout(Duration::from_secs(10), async {
        while repository.rejected() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker did not attempt both writes");
    wait_until_idle(&harness, QueueName::HighPriority).await;

    let view = harness.service.get_status(summary.job_id).await.unwrap();
    assert_eq!(view.job.status, JobStatus::InProgress);
    assert!(view.job.error_message.is_none());
    assert!(view.metrics.is_none());
    assert_eq!(repository.rejected(), 2);
    harness.stop().await;
}
