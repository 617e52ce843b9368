//! Configuration module
//!
//! Handles CLI configuration: simulator location and scheduler defaults.

use erst_scheduler::SchedulerConfig;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Simulator executable invoked for each job
    pub simulator: PathBuf,

    /// Scheduler defaults (poll interval, wait timeout, admission limit)
    pub scheduler: SchedulerConfig,
}
