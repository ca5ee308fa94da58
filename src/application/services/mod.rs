mod dispatcher;
mod job_lifecycle;
mod job_service;
mod pool_worker;
mod priority_router;

pub use dispatcher::{
    DEFAULT_QUEUE_CAPACITY, DispatchError, Dispatcher, PoolContext, PoolStatus, WorkerHandle,
};
pub use job_lifecycle::{JobLifecycle, LifecycleError};
pub use job_service::{JobService, JobServiceError, JobStatusView, JobSummary, RecoveryReport};
pub use priority_router::{
    DEFAULT_HIGH_PRIORITY_WORKERS, DEFAULT_LOW_PRIORITY_WORKERS, PriorityRouter, QueueName, Route,
};
