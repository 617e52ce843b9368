//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod debug;
mod session;

use anyhow::Result;
use clap::Subcommand;
use erst_scheduler::{CancellationToken, Scheduler, WaitOptions};
use std::time::Duration;

use crate::config::Config;
use crate::runner::SimulatorRunner;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Simulate a failed transaction and wait for the result
    Debug(debug::DebugArgs),
    /// Interactive console for background simulation jobs
    Session(session::SessionArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let scheduler = Scheduler::with_config(
        SimulatorRunner::new(&config.simulator),
        config.scheduler.clone(),
    );

    match command {
        Commands::Debug(args) => debug::handle_debug_command(args, &scheduler).await,
        Commands::Session(args) => session::handle_session_command(args, &scheduler).await,
    }
}

/// Wait options from the configured defaults, overridden by command flags
fn wait_options(
    scheduler: &Scheduler<SimulatorRunner>,
    timeout_secs: Option<u64>,
    poll_interval_ms: Option<u64>,
) -> WaitOptions {
    let mut options = scheduler.config().wait_options();
    if let Some(secs) = timeout_secs {
        options.timeout = Some(Duration::from_secs(secs));
    }
    if let Some(ms) = poll_interval_ms.filter(|ms| *ms > 0) {
        options.poll_interval = Duration::from_millis(ms);
        if let Some(cap) = options.max_poll_interval {
            options.max_poll_interval = Some(cap.max(options.poll_interval));
        }
    }
    options
}

/// Token cancelled when the user presses Ctrl-C
///
/// The listener stops once the token is cancelled, so callers cancel it
/// themselves after the wait it guards has finished.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let listener = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    listener.cancel();
                }
            }
            _ = listener.cancelled() => {}
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use erst_scheduler::SchedulerConfig;

    fn scheduler(config: SchedulerConfig) -> Scheduler<SimulatorRunner> {
        Scheduler::with_config(SimulatorRunner::new("erst-sim"), config)
    }

    #[test]
    fn test_wait_options_use_config_defaults() {
        let config = SchedulerConfig {
            wait_timeout: Some(Duration::from_secs(60)),
            ..SchedulerConfig::default()
        };
        let options = wait_options(&scheduler(config.clone()), None, None);

        assert_eq!(options.poll_interval, config.poll_interval);
        assert_eq!(options.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_wait_options_flags_override_config() {
        let config = SchedulerConfig {
            max_poll_interval: Some(Duration::from_millis(200)),
            ..SchedulerConfig::default()
        };
        let options = wait_options(&scheduler(config), Some(5), Some(1000));

        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.poll_interval, Duration::from_millis(1000));
        assert_eq!(options.max_poll_interval, Some(Duration::from_millis(1000)));
    }
}
