//! Dual worker pool scheduler.
//!
//! Each priority class owns a bounded FIFO queue of job ids and a fixed set of
//! worker tasks that share the receiving end. Workers take turns pulling from
//! the queue, so jobs of one class start in submission order while the two
//! classes run independently of each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::pool_worker::PoolWorker;
use super::{JobLifecycle, PriorityRouter, QueueName, Route};
use crate::application::ports::{MetricsRepository, Workload};
use crate::domain::{Job, JobId, Priority};

pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Collaborators shared by every worker of both pools.
#[derive(Clone)]
pub struct PoolContext {
    pub lifecycle: Arc<JobLifecycle>,
    pub metrics_repository: Arc<dyn MetricsRepository>,
    pub workload: Arc<dyn Workload>,
    pub shutdown: CancellationToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub queue: QueueName,
    pub capacity: usize,
    pub in_flight: usize,
    pub queued: usize,
}

struct PoolHandle {
    route: Route,
    sender: mpsc::Sender<JobId>,
    in_flight: Arc<AtomicUsize>,
}

impl PoolHandle {
    fn status(&self) -> PoolStatus {
        PoolStatus {
            queue: self.route.queue,
            capacity: self.route.pool_capacity,
            in_flight: self.in_flight.load(Ordering::SeqCst),
            queued: self.sender.max_capacity() - self.sender.capacity(),
        }
    }
}

pub struct Dispatcher {
    router: PriorityRouter,
    high: PoolHandle,
    low: PoolHandle,
}

impl Dispatcher {
    /// Spawns both pools. The returned handle resolves once every worker has
    /// observed the shutdown token and finished the job it was running.
    pub fn start(
        router: PriorityRouter,
        queue_capacity: usize,
        context: PoolContext,
    ) -> (Self, WorkerHandle) {
        let mut handles = Vec::new();
        let high = spawn_pool(
            router.route(Priority::High),
            queue_capacity,
            &context,
            &mut handles,
        );
        let low = spawn_pool(
            router.route(Priority::Low),
            queue_capacity,
            &context,
            &mut handles,
        );

        (Self { router, high, low }, WorkerHandle { handles })
    }

    /// Hands a QUEUED job to its pool without waiting for a free slot.
    pub fn enqueue(&self, job: &Job) -> Result<Route, DispatchError> {
        let route = self.router.route(job.priority);
        let pool = self.pool(route.queue);

        pool.sender.try_send(job.id).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull(route.queue),
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed(route.queue),
        })?;

        tracing::debug!(job_id = %job.id, queue = %route.queue, "Job enqueued");
        Ok(route)
    }

    pub fn in_flight(&self, queue: QueueName) -> usize {
        self.pool(queue).in_flight.load(Ordering::SeqCst)
    }

    pub fn pool_status(&self) -> Vec<PoolStatus> {
        vec![self.high.status(), self.low.status()]
    }

    fn pool(&self, queue: QueueName) -> &PoolHandle {
        match queue {
            QueueName::HighPriority => &self.high,
            QueueName::LowPriority => &self.low,
        }
    }
}

fn spawn_pool(
    route: Route,
    queue_capacity: usize,
    context: &PoolContext,
    handles: &mut Vec<JoinHandle<()>>,
) -> PoolHandle {
    let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
    let receiver = Arc::new(Mutex::new(receiver));
    let in_flight = Arc::new(AtomicUsize::new(0));

    for slot in 1..=route.pool_capacity {
        let worker = PoolWorker {
            receiver: Arc::clone(&receiver),
            in_flight: Arc::clone(&in_flight),
            context: context.clone(),
        };
        let span = tracing::info_span!("worker", pool = %route.queue, slot);
        handles.push(tokio::spawn(worker.run().instrument(span)));
    }

    tracing::info!(
        queue = %route.queue,
        workers = route.pool_capacity,
        queue_capacity,
        "Worker pool started"
    );

    PoolHandle {
        route,
        sender,
        in_flight,
    }
}

/// Join handles of every spawned worker.
#[derive(Debug)]
pub struct WorkerHandle {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    pub async fn wait_for_shutdown(self) {
        join_all(self.handles).await.into_iter().for_each(|result| {
            if let Err(error) = result {
                tracing::warn!(%error, "Pool worker task panicked");
            }
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("{0} queue is full")]
    QueueFull(QueueName),
    #[error("{0} queue is closed")]
    Closed(QueueName),
}
