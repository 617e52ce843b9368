//! Job DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobId, JobStatus};

/// Job summary for listing and JSON output
///
/// Carries everything about a job except its result payload, whose shape
/// belongs to whoever runs the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub status: JobStatus,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobSummary {
    /// Wall-clock time between start and completion, if both are known
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => Some(completed.signed_duration_since(started)),
            _ => None,
        }
    }
}
