//! Erst Scheduler
//!
//! Background execution engine for long-running transaction simulations.
//!
//! A caller submits work and gets a [`JobId`] back immediately. Each job runs
//! on its own task while the caller polls it, waits on it with a timeout and
//! a cancellation token, or discards it.
//!
//! Architecture:
//! - Runner: the synchronous work to run, supplied by the caller
//! - Job table: concurrency-safe map of job ids to records
//! - Execution task: one per job, drives its record to a terminal state
//! - Scheduler: the submit / poll / wait / cleanup façade
//!
//! # Example
//!
//! ```no_run
//! use erst_scheduler::{CancellationToken, FnRunner, Scheduler, WaitOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scheduler = Scheduler::new(FnRunner::new(|tx: String| Ok(format!("simulated {}", tx))));
//!
//!     let id = scheduler.submit("abc123".to_string())?;
//!     let options = WaitOptions::new(Duration::from_millis(100)).with_timeout(Duration::from_secs(30));
//!     let trace = scheduler.wait(id, &options, &CancellationToken::new()).await?;
//!
//!     println!("{}", trace);
//!     scheduler.cleanup(id)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod record;
pub mod runner;
pub mod scheduler;
pub mod table;
mod task;

// Re-export commonly used types
pub use config::{MIN_POLL_INTERVAL, SchedulerConfig, WaitOptions};
pub use erst_core::domain::job::{JobId, JobStatus};
pub use error::{Result, SchedulerError};
pub use record::{JobFailure, JobRecord};
pub use runner::{FnRunner, Runner};
pub use scheduler::Scheduler;
pub use table::JobTable;
pub use tokio_util::sync::CancellationToken;
