//! Session command handler
//!
//! A line-oriented console that keeps the scheduler alive for as long as the
//! process runs, so simulations can be submitted in the background and
//! checked on later. Ctrl-C during `wait` cancels only that wait.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use erst_scheduler::{JobId, Scheduler, SchedulerError};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::{cancel_on_ctrl_c, wait_options};
use crate::display::{print_job_details, print_job_summary, print_simulation};
use crate::id_resolver::resolve_job_id;
use crate::runner::{SimulatorRunner, load_request};

/// Arguments of `erst session`
#[derive(Args)]
pub struct SessionArgs {
    /// Do not print a prompt (for scripted input)
    #[arg(long)]
    no_prompt: bool,
}

/// One console line
#[derive(Parser)]
#[command(name = "erst>", no_binary_name = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

/// Console commands
#[derive(Subcommand)]
enum SessionCommand {
    /// Start a simulation in the background
    Submit {
        /// Simulation request JSON
        request: PathBuf,
    },
    /// Show a job's current state
    Poll {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Block until a job finishes
    Wait {
        /// Job ID or unambiguous prefix
        id: String,

        /// Give up waiting after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Milliseconds between status checks
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
    /// Forget a job (a running simulation is left to finish unobserved)
    Cleanup {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// List tracked jobs
    List,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Handle `erst session`
pub async fn handle_session_command(
    args: SessionArgs,
    scheduler: &Scheduler<SimulatorRunner>,
) -> Result<()> {
    if !args.no_prompt {
        println!("{}", "Erst session. Type `help` for commands.".bold());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !args.no_prompt {
            print!("{} ", "erst>".bold());
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match SessionLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                // help output is reported through the error path as well
                err.print().context("Failed to write to the console")?;
                continue;
            }
        };

        if matches!(command, SessionCommand::Quit) {
            break;
        }

        if let Err(e) = run_command(command, scheduler).await {
            println!("{} {:#}", "✗".red(), e);
        }
    }

    let in_flight = scheduler
        .list()
        .iter()
        .filter(|record| !record.is_terminal())
        .count();
    if in_flight > 0 {
        warn!("Leaving session with {} job(s) in flight", in_flight);
        println!(
            "{}",
            format!("⚠ {} job(s) still running will be abandoned", in_flight).yellow()
        );
    }

    Ok(())
}

/// Runs one parsed console command
async fn run_command(command: SessionCommand, scheduler: &Scheduler<SimulatorRunner>) -> Result<()> {
    match command {
        SessionCommand::Submit { request } => {
            let request = load_request(&request)?;
            let id = scheduler.submit(request)?;
            println!("Submitted job {}", id.to_string().cyan());
        }
        SessionCommand::Poll { id } => {
            let id = resolve(scheduler, &id)?;
            let record = scheduler.poll(id)?;
            print_job_details(&record.summary());
            if let Some(response) = record.result() {
                print_simulation(response);
            }
        }
        SessionCommand::Wait {
            id,
            timeout,
            poll_interval_ms,
        } => {
            let id = resolve(scheduler, &id)?;
            let options = wait_options(scheduler, timeout, poll_interval_ms);

            let cancel = cancel_on_ctrl_c();
            let outcome = scheduler.wait(id, &options, &cancel).await;
            cancel.cancel();

            match outcome {
                Ok(response) => print_simulation(&response),
                Err(err @ (SchedulerError::Timeout { .. } | SchedulerError::Cancelled(_))) => {
                    println!("{}", format!("⚠ {}", err).yellow());
                    println!(
                        "{}",
                        "  The job keeps running; poll or wait again later.".dimmed()
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        SessionCommand::Cleanup { id } => {
            let id = resolve(scheduler, &id)?;
            scheduler.cleanup(id)?;
            println!("Job {} removed", id.to_string().dimmed());
        }
        SessionCommand::List => {
            let jobs = scheduler.list();
            if jobs.is_empty() {
                println!("{}", "No jobs found.".yellow());
            } else {
                println!("{}", format!("Found {} job(s):", jobs.len()).bold());
                println!();
                for job in jobs {
                    print_job_summary(&job.summary());
                }
            }
        }
        SessionCommand::Quit => {}
    }

    Ok(())
}

fn resolve(scheduler: &Scheduler<SimulatorRunner>, input: &str) -> Result<JobId> {
    resolve_job_id(input, scheduler.list().iter().map(|record| record.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<SessionCommand, clap::Error> {
        SessionLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(parse("list").unwrap(), SessionCommand::List));
        assert!(matches!(parse("exit").unwrap(), SessionCommand::Quit));
        assert!(matches!(
            parse("wait abc --timeout 5").unwrap(),
            SessionCommand::Wait { ref id, timeout: Some(5), poll_interval_ms: None } if id == "abc"
        ));
        assert!(matches!(
            parse("submit req.json").unwrap(),
            SessionCommand::Submit { ref request } if request == &PathBuf::from("req.json")
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        assert!(parse("frobnicate").is_err());
        assert!(parse("poll").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_submit_wait_cleanup_through_console() {
        let runner = SimulatorRunner::new("sh").with_args([
            "-c",
            r#"cat >/dev/null; echo '{"status":"success","error":null,"events":[],"logs":["ok"]}'"#,
        ]);
        let scheduler = Scheduler::new(runner);

        let path = std::env::temp_dir().join(format!("erst-session-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"envelope_xdr":"AAAA","result_meta_xdr":"BBBB"}"#).unwrap();

        run_command(SessionCommand::Submit { request: path.clone() }, &scheduler)
            .await
            .unwrap();
        let id = scheduler.list()[0].id();
        let prefix = id.to_string()[..8].to_string();

        run_command(
            SessionCommand::Wait {
                id: prefix.clone(),
                timeout: Some(10),
                poll_interval_ms: Some(10),
            },
            &scheduler,
        )
        .await
        .unwrap();
        assert_eq!(
            scheduler.poll(id).unwrap().result().map(|r| r.logs.clone()),
            Some(vec!["ok".to_string()])
        );

        run_command(SessionCommand::Cleanup { id: prefix.clone() }, &scheduler)
            .await
            .unwrap();
        assert!(scheduler.is_empty());
        assert!(
            run_command(SessionCommand::Poll { id: prefix }, &scheduler)
                .await
                .is_err()
        );

        std::fs::remove_file(&path).unwrap();
    }
}
