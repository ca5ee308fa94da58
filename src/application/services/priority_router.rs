use std::fmt;

use crate::domain::Priority;

pub const DEFAULT_HIGH_PRIORITY_WORKERS: usize = 4;
pub const DEFAULT_LOW_PRIORITY_WORKERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueName {
    HighPriority,
    LowPriority,
}

impl QueueName {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueName::HighPriority => "high_priority",
            QueueName::LowPriority => "low_priority",
        }
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub queue: QueueName,
    pub pool_capacity: usize,
}

/// Static priority-to-pool table. High-priority work always gets the larger
/// pool; nothing is reweighed or promoted at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityRouter {
    high: Route,
    low: Route,
}

impl PriorityRouter {
    pub fn new(high_priority_workers: usize, low_priority_workers: usize) -> Self {
        Self {
            high: Route {
                queue: QueueName::HighPriority,
                pool_capacity: high_priority_workers.max(1),
            },
            low: Route {
                queue: QueueName::LowPriority,
                pool_capacity: low_priority_workers.max(1),
            },
        }
    }

    pub fn route(&self, priority: Priority) -> Route {
        match priority {
            Priority::High => self.high,
            Priority::Low => self.low,
        }
    }

    pub fn routes(&self) -> [Route; 2] {
        [self.high, self.low]
    }
}

impl Default for PriorityRouter {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_PRIORITY_WORKERS, DEFAULT_LOW_PRIORITY_WORKERS)
    }
}
