//! Job records
//!
//! A [`JobRecord`] is the single source of truth about one job. Its fields are
//! private and only move through the transition methods below, so a record
//! can never carry a result and an error at once, or a result before it
//! finished.

use erst_core::domain::job::{JobId, JobStatus};
use erst_core::dto::job::JobSummary;
use std::fmt;
use std::sync::Arc;

use crate::error::SchedulerError;

/// Why a job failed
#[derive(Debug, Clone)]
pub enum JobFailure {
    /// The runner returned an error
    Runner(Arc<anyhow::Error>),
    /// The execution task faulted (panic inside the runner, or torn down)
    Fault(String),
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobFailure::Runner(err) => write!(f, "{:#}", err),
            JobFailure::Fault(msg) => write!(f, "Internal fault: {}", msg),
        }
    }
}

impl From<JobFailure> for SchedulerError {
    fn from(failure: JobFailure) -> Self {
        match failure {
            JobFailure::Runner(err) => SchedulerError::RunnerFailure(err),
            JobFailure::Fault(msg) => SchedulerError::InternalFault(msg),
        }
    }
}

/// Final outcome handed to [`JobRecord::complete`]
#[derive(Debug)]
pub enum Completion<T> {
    Succeeded(T),
    Failed(JobFailure),
}

/// Tracked state of one background job
#[derive(Debug, Clone)]
pub struct JobRecord<T> {
    id: JobId,
    status: JobStatus,
    submitted_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    result: Option<T>,
    error: Option<JobFailure>,
}

impl<T> JobRecord<T> {
    /// Creates a pending record stamped with the current time
    pub fn pending(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            submitted_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn submitted_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.submitted_at
    }

    pub fn started_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.completed_at
    }

    /// Stored result; present only once the job succeeded
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Stored failure; present only once the job failed
    pub fn error(&self) -> Option<&JobFailure> {
        self.error.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves a pending record to running
    ///
    /// Returns `false` and leaves the record untouched if it is not pending.
    pub fn start(&mut self) -> bool {
        if !self.status.can_transition_to(JobStatus::Running) {
            return false;
        }
        self.status = JobStatus::Running;
        self.started_at = Some(chrono::Utc::now());
        true
    }

    /// Records the terminal outcome
    ///
    /// Sets the status, the payload, and `completed_at` together. Returns
    /// `false` if the record is already terminal; the first outcome wins.
    pub fn complete(&mut self, completion: Completion<T>) -> bool {
        if self.is_terminal() {
            return false;
        }
        match completion {
            Completion::Succeeded(value) => {
                self.status = JobStatus::Succeeded;
                self.result = Some(value);
            }
            Completion::Failed(failure) => {
                self.status = JobStatus::Failed;
                self.error = Some(failure);
            }
        }
        self.completed_at = Some(chrono::Utc::now());
        true
    }

    /// Terminal outcome, or `None` while the job is still in flight
    pub fn outcome(&self) -> Option<Result<T, SchedulerError>>
    where
        T: Clone,
    {
        match self.status {
            JobStatus::Pending | JobStatus::Running => None,
            JobStatus::Succeeded => self.result.clone().map(Ok),
            JobStatus::Failed => self.error.clone().map(|failure| Err(failure.into())),
            JobStatus::Cancelled => Some(Err(SchedulerError::Cancelled(self.id))),
        }
    }

    /// Serializable view without the result payload
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            status: self.status,
            submitted_at: self.submitted_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            error: self.error.as_ref().map(ToString::to_string),
        }
    }
}
