use chrono::{DateTime, Utc};

use super::{JobId, JobStatus, JobSubmission, Priority};

const UNKNOWN_FAILURE: &str = "unknown error";

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub source_file: String,
    pub target_format: String,
    pub priority: Priority,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub queued_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition from {from} to {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl Job {
    pub fn new(submission: JobSubmission) -> Self {
        Self {
            id: JobId::new(),
            source_file: submission.source_file,
            target_format: submission.target_format,
            priority: submission.priority,
            status: JobStatus::Pending,
            error_message: None,
            created_at: Utc::now(),
            queued_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn mark_queued(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Queued)?;
        self.queued_at = Some(self.monotonic(at));
        Ok(())
    }

    pub fn mark_started(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::InProgress)?;
        self.started_at = Some(self.monotonic(at));
        Ok(())
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Completed)?;
        self.completed_at = Some(self.monotonic(at));
        Ok(())
    }

    /// Moves any non-terminal job to FAILED. The message is kept as given; a
    /// blank one is replaced so a failed job always explains itself.
    pub fn mark_failed(&mut self, message: &str, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobStatus::Failed)?;
        self.error_message = Some(if message.trim().is_empty() {
            UNKNOWN_FAILURE.to_string()
        } else {
            message.to_string()
        });
        self.completed_at = Some(self.monotonic(at));
        Ok(())
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    // Wall clocks can step backwards; lifecycle timestamps must not.
    fn monotonic(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        [self.queued_at, self.started_at, self.completed_at]
            .into_iter()
            .flatten()
            .fold(self.created_at.max(at), |latest, ts| latest.max(ts))
    }
}
