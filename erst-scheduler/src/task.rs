//! Execution task
//!
//! Each submitted job gets one spawned task that drives its record from
//! pending to a terminal state. The blocking runner call happens on the
//! blocking thread pool; the task itself only awaits it.

use erst_core::domain::job::JobId;
use std::any::Any;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::OwnedSemaphorePermit;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::record::{Completion, JobFailure};
use crate::runner::Runner;
use crate::table::JobTable;

/// Records the terminal state of one job exactly once
///
/// If the task is torn down before [`CompletionGuard::finish`] runs (runtime
/// shutdown, panic in the task body), `Drop` marks the job failed so its
/// record never stays in `Running`.
struct CompletionGuard<T> {
    table: Arc<JobTable<T>>,
    id: JobId,
    finished: bool,
}

impl<T> CompletionGuard<T> {
    fn new(table: Arc<JobTable<T>>, id: JobId) -> Self {
        Self {
            table,
            id,
            finished: false,
        }
    }

    fn finish(mut self, completion: Completion<T>) {
        self.finished = true;
        record_completion(&self.table, self.id, completion);
    }
}

impl<T> Drop for CompletionGuard<T> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // also reached on runtime shutdown with the job still running
        debug!("Execution task for job {} ended without an outcome", self.id);
        record_completion(
            &self.table,
            self.id,
            Completion::Failed(JobFailure::Fault(
                "execution task aborted before completion".to_string(),
            )),
        );
    }
}

fn record_completion<T>(table: &JobTable<T>, id: JobId, completion: Completion<T>) {
    let succeeded = matches!(completion, Completion::Succeeded(_));
    match table.update(id, |record| record.complete(completion)) {
        Ok(true) => info!(
            "Job {} completed with status: {}",
            id,
            if succeeded { "succeeded" } else { "failed" }
        ),
        Ok(false) => warn!("Job {} already reached a terminal state", id),
        Err(_) => debug!("Job {} was cleaned up while running, discarding outcome", id),
    }
}

/// Spawns the execution task for one job
///
/// The optional permit is held until the job finishes, bounding the number
/// of jobs in flight.
pub(crate) fn spawn<R: Runner>(
    handle: &Handle,
    table: Arc<JobTable<R::Output>>,
    runner: Arc<R>,
    id: JobId,
    input: R::Input,
    permit: Option<OwnedSemaphorePermit>,
) -> JoinHandle<()> {
    handle.spawn(async move {
        execute(table, runner, id, input).await;
        drop(permit);
    })
}

async fn execute<R: Runner>(
    table: Arc<JobTable<R::Output>>,
    runner: Arc<R>,
    id: JobId,
    input: R::Input,
) {
    match table.update(id, |record| record.start()) {
        Ok(true) => debug!("Job {} started", id),
        Ok(false) => {
            warn!("Job {} was not pending when its task started", id);
            return;
        }
        Err(_) => {
            debug!("Job {} was cleaned up before it started, skipping run", id);
            return;
        }
    }

    let guard = CompletionGuard::new(Arc::clone(&table), id);

    let joined = tokio::task::spawn_blocking(move || runner.run(input)).await;

    guard.finish(completion_from(id, joined));
}

fn completion_from<T>(id: JobId, joined: Result<anyhow::Result<T>, JoinError>) -> Completion<T> {
    match joined {
        Ok(Ok(value)) => Completion::Succeeded(value),
        Ok(Err(err)) => {
            debug!("Runner returned an error for job {}: {:#}", id, err);
            Completion::Failed(JobFailure::Runner(Arc::new(err)))
        }
        Err(join_err) if join_err.is_panic() => {
            let message = panic_message(join_err.into_panic());
            error!("Runner panicked for job {}: {}", id, message);
            Completion::Failed(JobFailure::Fault(format!("runner panicked: {}", message)))
        }
        Err(join_err) => {
            error!("Runner task for job {} did not finish: {}", id, join_err);
            Completion::Failed(JobFailure::Fault(join_err.to_string()))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::JobRecord;
    use crate::runner::FnRunner;
    use erst_core::domain::job::JobStatus;

    fn pending_job<T>(table: &JobTable<T>) -> JobId {
        let id = JobId::generate();
        table.insert(id, JobRecord::pending(id)).unwrap();
        id
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("static str")), "static str");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(42u8)), "unknown panic payload");
    }

    #[tokio::test]
    async fn test_task_records_success() {
        let table = Arc::new(JobTable::new());
        let id = pending_job(&table);
        let runner = Arc::new(FnRunner::new(|n: u32| Ok(n + 1)));

        spawn(&Handle::current(), Arc::clone(&table), runner, id, 41, None)
            .await
            .unwrap();

        let record = table.get(id).unwrap();
        assert_eq!(record.status(), JobStatus::Succeeded);
        assert_eq!(record.result(), Some(&42));
        assert!(record.started_at().is_some());
        assert!(record.completed_at().is_some());
    }

    #[tokio::test]
    async fn test_task_converts_panic_into_failure() {
        let table = Arc::new(JobTable::<u32>::new());
        let id = pending_job(&table);
        let runner = Arc::new(FnRunner::new(|_: ()| -> anyhow::Result<u32> {
            panic!("host crashed")
        }));

        spawn(&Handle::current(), Arc::clone(&table), runner, id, (), None)
            .await
            .unwrap();

        let record = table.get(id).unwrap();
        assert_eq!(record.status(), JobStatus::Failed);
        match record.error() {
            Some(JobFailure::Fault(msg)) => assert!(msg.contains("host crashed")),
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_task_skips_run_when_cleaned_up_before_start() {
        let table = Arc::new(JobTable::<u32>::new());
        let id = pending_job(&table);
        table.delete(id).unwrap();

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let runner = Arc::new(FnRunner::new(move |_: ()| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(0u32)
        }));

        spawn(&Handle::current(), Arc::clone(&table), runner, id, (), None)
            .await
            .unwrap();

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(table.get(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_dropped_guard_marks_job_failed() {
        let table = Arc::new(JobTable::<u32>::new());
        let id = pending_job(&table);
        table.update(id, |record| record.start()).unwrap();

        drop(CompletionGuard::new(Arc::clone(&table), id));

        let record = table.get(id).unwrap();
        assert_eq!(record.status(), JobStatus::Failed);
        assert!(matches!(record.error(), Some(JobFailure::Fault(_))));
    }

    #[test]
    fn test_guard_does_not_resurrect_deleted_record() {
        let table = Arc::new(JobTable::<u32>::new());
        let id = pending_job(&table);
        let guard = CompletionGuard::new(Arc::clone(&table), id);
        table.delete(id).unwrap();

        guard.finish(Completion::Succeeded(1));

        assert!(table.is_empty());
    }
}
