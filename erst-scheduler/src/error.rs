//! Error types for the job scheduler

use erst_core::domain::job::JobId;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors that can occur when submitting, querying, or waiting on jobs
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// The id was never submitted or has already been cleaned up
    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// Wait deadline elapsed; the job keeps running
    #[error("Timed out after {waited:?} waiting for job {id}")]
    Timeout {
        /// Job that was being waited on
        id: JobId,
        /// Time spent waiting
        waited: Duration,
    },

    /// The wait was cancelled by the caller; the job keeps running
    #[error("Wait for job {0} was cancelled")]
    Cancelled(JobId),

    /// The runner returned an error, carried unchanged
    #[error("{0:#}")]
    RunnerFailure(Arc<anyhow::Error>),

    /// The execution task faulted while running the job
    #[error("Internal fault: {0}")]
    InternalFault(String),

    /// An id was inserted twice into the job table
    #[error("Job already exists: {0}")]
    DuplicateJob(JobId),

    /// Admission limit reached
    #[error("Scheduler at capacity ({limit} concurrent jobs)")]
    CapacityExhausted {
        /// Configured concurrent job limit
        limit: usize,
    },

    /// No async runtime is available to run the job
    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),
}

impl SchedulerError {
    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if the job may still finish (poll again later)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cancelled(_))
    }

    /// Check if this error is the final outcome of a failed job
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::RunnerFailure(_) | Self::InternalFault(_))
    }

    /// The runner's own error, if this is a runner failure
    pub fn runner_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::RunnerFailure(err) => Some(&**err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let id = JobId::generate();

        assert!(SchedulerError::NotFound(id).is_not_found());
        assert!(SchedulerError::Cancelled(id).is_transient());
        assert!(
            SchedulerError::Timeout {
                id,
                waited: Duration::from_millis(50)
            }
            .is_transient()
        );
        assert!(SchedulerError::InternalFault("boom".to_string()).is_job_failure());
        assert!(!SchedulerError::Cancelled(id).is_job_failure());
    }

    #[test]
    fn test_runner_failure_displays_runner_message() {
        let err = anyhow::anyhow!("contract trapped").context("simulation failed");
        let wrapped = SchedulerError::RunnerFailure(Arc::new(err));

        assert_eq!(wrapped.to_string(), "simulation failed: contract trapped");
        assert!(wrapped.runner_error().is_some());
        assert!(wrapped.is_job_failure());
    }
}
