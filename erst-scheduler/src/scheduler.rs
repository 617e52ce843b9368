//! Scheduler façade
//!
//! Composes the job table, the execution tasks, and the runner into the
//! submit / poll / wait / cleanup surface used by callers.

use erst_core::domain::job::JobId;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{SchedulerConfig, WaitOptions};
use crate::error::{Result, SchedulerError};
use crate::record::JobRecord;
use crate::runner::Runner;
use crate::table::JobTable;
use crate::task;

/// In-memory background job scheduler
///
/// Owns its own job table, so independent instances never share state.
/// Cloning is cheap and yields a handle to the same table and runner.
pub struct Scheduler<R: Runner> {
    table: Arc<JobTable<R::Output>>,
    runner: Arc<R>,
    slots: Option<Arc<Semaphore>>,
    config: SchedulerConfig,
}

impl<R: Runner> Clone for Scheduler<R> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            runner: Arc::clone(&self.runner),
            slots: self.slots.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: Runner> Scheduler<R> {
    /// Creates a scheduler with default configuration
    pub fn new(runner: R) -> Self {
        Self::with_config(runner, SchedulerConfig::default())
    }

    /// Creates a scheduler with the given configuration
    pub fn with_config(runner: R, config: SchedulerConfig) -> Self {
        let slots = config
            .max_concurrent_jobs
            .map(|limit| Arc::new(Semaphore::new(limit)));
        Self {
            table: Arc::new(JobTable::new()),
            runner: Arc::new(runner),
            slots,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Submits a job and returns its id without waiting for it to run
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - `Unavailable` if no runtime is available to spawn the task on
    /// - `CapacityExhausted` if the admission limit is reached
    pub fn submit(&self, input: R::Input) -> Result<JobId> {
        let handle =
            Handle::try_current().map_err(|e| SchedulerError::Unavailable(e.to_string()))?;

        let permit = match &self.slots {
            Some(slots) => Some(Arc::clone(slots).try_acquire_owned().map_err(|_| {
                SchedulerError::CapacityExhausted {
                    limit: self.config.max_concurrent_jobs.unwrap_or_default(),
                }
            })?),
            None => None,
        };

        let id = JobId::generate();
        self.table.insert(id, JobRecord::pending(id))?;

        task::spawn(
            &handle,
            Arc::clone(&self.table),
            Arc::clone(&self.runner),
            id,
            input,
            permit,
        );

        info!("Job {} submitted", id);
        Ok(id)
    }

    /// Returns a snapshot of a job
    pub fn poll(&self, id: JobId) -> Result<JobRecord<R::Output>> {
        self.table.get(id)
    }

    /// Blocks until the job finishes, the timeout elapses, or `cancel` fires
    ///
    /// Timeout and cancellation only end this wait; the job keeps running and
    /// can be polled or waited on again.
    ///
    /// # Errors
    /// - `NotFound` if the id is unknown (or cleaned up during the wait)
    /// - `Timeout` / `Cancelled` if the wait ended before the job did
    /// - the job's own failure (`RunnerFailure` or `InternalFault`)
    pub async fn wait(
        &self,
        id: JobId,
        options: &WaitOptions,
        cancel: &CancellationToken,
    ) -> Result<R::Output> {
        let started = Instant::now();
        let deadline = options.effective_timeout().map(|timeout| started + timeout);
        let mut interval = options.first_interval();

        loop {
            let record = self.table.get(id)?;
            if let Some(outcome) = record.outcome() {
                return outcome;
            }

            let sleep = tokio::time::sleep(interval);
            let expired = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Wait for job {} cancelled", id);
                    return Err(SchedulerError::Cancelled(id));
                }
                _ = expired => {
                    let waited = started.elapsed();
                    debug!("Wait for job {} timed out after {:?}", id, waited);
                    return Err(SchedulerError::Timeout { id, waited });
                }
                _ = sleep => {}
            }

            interval = options.next_interval(interval);
        }
    }

    /// Waits using the configured defaults
    pub async fn wait_default(&self, id: JobId, cancel: &CancellationToken) -> Result<R::Output> {
        let options = self.config.wait_options();
        self.wait(id, &options, cancel).await
    }

    /// Forgets a job
    ///
    /// A running job is not interrupted; its outcome is discarded when it
    /// finishes.
    pub fn cleanup(&self, id: JobId) -> Result<()> {
        let record = self.table.delete(id)?;
        info!("Job {} cleaned up (status: {})", id, record.status());
        Ok(())
    }

    /// Snapshots of all tracked jobs, oldest first
    pub fn list(&self) -> Vec<JobRecord<R::Output>> {
        self.table.list()
    }

    /// Number of jobs currently tracked
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
