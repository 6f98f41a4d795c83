//! Job lifecycle types.
//!
//! ```text
//!   submit() ──→ Queued ──→ Running ──→ Completed
//!                  │           │
//!                  │           ├──→ Failed(reason)
//!                  │           ├──→ Interrupted(reason)
//!                  │           │
//!                  └───────────┴──→ Cancelled
//! ```
//!
//! Terminal states never change. `result()` is only valid once `Completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque job identifier issued by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting in the queue.
    Queued,
    /// Executing.
    Running,
    /// Finished with a result.
    Completed,
    /// Finished without a result.
    Failed(String),
    /// Stopped by the backend for a reason that may clear on resubmission.
    Interrupted(String),
    /// Cancelled before finishing.
    Cancelled,
}

impl JobStatus {
    /// Whether the job can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed
                | JobStatus::Failed(_)
                | JobStatus::Interrupted(_)
                | JobStatus::Cancelled
        )
    }

    /// Whether the job is queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Interrupted(msg) => write!(f, "Interrupted: {msg}"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Bookkeeping record for a submitted job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Identifier.
    pub id: JobId,
    /// Backend that accepted the job.
    pub backend: String,
    /// Current status.
    pub status: JobStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Time of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A freshly queued job.
    pub fn new(id: JobId, backend: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            backend: backend.into(),
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `status` unless already terminal. Returns whether the status
    /// changed.
    pub fn transition(&mut self, status: JobStatus) -> bool {
        if self.status.is_terminal() || self.status == status {
            return false;
        }
        self.status = status;
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_display() {
        let id = JobId::from("d1x9k2");
        assert_eq!(id.to_string(), "d1x9k2");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"d1x9k2\"");
    }

    #[test]
    fn test_status_predicates() {
        assert!(JobStatus::Queued.is_pending());
        assert!(JobStatus::Failed("x".into()).is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert_eq!(JobStatus::Failed("boom".into()).to_string(), "Failed: boom");
        assert!(JobStatus::Interrupted("preempted".into()).is_terminal());
        assert!(!JobStatus::Interrupted("preempted".into()).is_pending());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = Job::new(JobId::new("j"), "mock");
        assert!(job.transition(JobStatus::Running));
        assert!(job.transition(JobStatus::Completed));
        assert!(!job.transition(JobStatus::Cancelled));
        assert_eq!(job.status, JobStatus::Completed);
    }
}
