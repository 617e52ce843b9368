//! Debug command handler
//!
//! Submits one simulation, then blocks on it until it finishes, the timeout
//! elapses, or the user presses Ctrl-C.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::*;
use erst_scheduler::{Scheduler, SchedulerError};
use std::path::PathBuf;

use super::{cancel_on_ctrl_c, wait_options};
use crate::display::{print_job_details, print_simulation};
use crate::runner::{SimulatorRunner, load_request};

/// Arguments of `erst debug`
#[derive(Args)]
pub struct DebugArgs {
    /// Simulation request JSON (envelope and result meta XDR)
    request: PathBuf,

    /// Give up waiting after this many seconds (0 waits indefinitely)
    #[arg(long)]
    timeout: Option<u64>,

    /// Milliseconds between status checks
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Print the simulator response as JSON
    #[arg(long)]
    json: bool,
}

/// Handle `erst debug`
pub async fn handle_debug_command(
    args: DebugArgs,
    scheduler: &Scheduler<SimulatorRunner>,
) -> Result<()> {
    let request = load_request(&args.request)?;
    let options = wait_options(scheduler, args.timeout, args.poll_interval_ms);

    let id = scheduler.submit(request)?;
    if !args.json {
        println!("Debugging: {}", args.request.display());
        println!("Job:       {}", id.to_string().cyan());
    }

    let cancel = cancel_on_ctrl_c();
    let outcome = scheduler.wait(id, &options, &cancel).await;
    cancel.cancel();

    match outcome {
        Ok(response) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_simulation(&response);
            }
            scheduler.cleanup(id)?;
            Ok(())
        }
        Err(SchedulerError::Timeout { waited, .. }) => {
            println!(
                "{}",
                format!(
                    "⚠ Simulation still running after {:.1}s (job {})",
                    waited.as_secs_f64(),
                    id
                )
                .yellow()
            );
            println!(
                "{}",
                "  Use `erst session` to keep long simulations running in the background."
                    .dimmed()
            );
            Err(anyhow!("Timed out waiting for job {}", id))
        }
        Err(SchedulerError::Cancelled(_)) => {
            println!("{}", "Wait cancelled.".yellow());
            Err(anyhow!("Cancelled while waiting for job {}", id))
        }
        Err(err) if err.is_job_failure() => {
            if let Ok(record) = scheduler.poll(id) {
                print_job_details(&record.summary());
            }
            Err(anyhow!("Simulation failed: {}", err))
        }
        Err(err) => Err(err.into()),
    }
}
