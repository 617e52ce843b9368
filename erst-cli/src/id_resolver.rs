//! ID resolver module
//!
//! Lets session users type a short, unambiguous prefix instead of a full
//! job id.

use anyhow::{Result, anyhow};
use erst_core::domain::job::JobId;

/// Resolve a job ID or prefix to a full job id
///
/// A complete id is returned as-is, even if no such job is tracked, so the
/// scheduler can report it as not found. Anything else is matched as a
/// case-insensitive prefix against `known`.
///
/// # Errors
/// Returns an error if:
/// - No job matches the prefix
/// - Multiple jobs match the prefix (ambiguous)
pub fn resolve_job_id(input: &str, known: impl IntoIterator<Item = JobId>) -> Result<JobId> {
    if let Ok(id) = input.parse::<JobId>() {
        return Ok(id);
    }

    let prefix = input.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(anyhow!("Job ID cannot be empty"));
    }

    let matches: Vec<JobId> = known
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => Err(anyhow!("No job found with ID starting with '{}'", prefix)),
        1 => Ok(matches[0]),
        _ => {
            let ids: Vec<String> = matches.iter().map(ToString::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}
