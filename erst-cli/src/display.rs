//! Terminal output helpers

use colored::*;
use erst_core::domain::job::JobStatus;
use erst_core::dto::job::JobSummary;
use erst_core::simulation::SimulationResponse;

/// Print a one-entry job summary for listings
pub fn print_job_summary(job: &JobSummary) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Status:    {}", colorize_status(&job.status));
    println!(
        "    Submitted: {}",
        job.submitted_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed job information
pub fn print_job_details(job: &JobSummary) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    println!("  Status:      {}", colorize_status(&job.status));
    println!(
        "  Submitted:   {}",
        job.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(started) = job.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(duration) = job.duration() {
        println!("  Duration:    {}ms", duration.num_milliseconds());
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Print the events and logs of a finished simulation
pub fn print_simulation(response: &SimulationResponse) {
    println!("\n{}", "Simulation:".bold());
    println!("  Status: {}", response.status.green());

    if response.logs.is_empty() {
        println!("  {}", "No logs.".dimmed());
    } else {
        println!("\n{}", "Logs:".bold());
        for log in &response.logs {
            println!("  {}", log);
        }
    }

    if !response.events.is_empty() {
        println!("\n{}", "Events:".bold());
        println!("{}", "─".repeat(80).dimmed());
        for event in &response.events {
            println!("{}", event);
        }
        println!("{}", "─".repeat(80).dimmed());
    }
}

/// Colorize job status for display
pub fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Succeeded => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
    }
}
