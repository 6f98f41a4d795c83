//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in backend operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Backend is not accepting jobs right now.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// No backend or device is registered under this name.
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// Job submission was rejected.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// Job failed on the backend.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job failed for a reason that may not recur (queue eviction, calibration
    /// window, dropped connection).
    #[error("Transient job failure: {0}")]
    TransientFailure(String),

    /// Job was cancelled.
    #[error("Job cancelled")]
    JobCancelled,

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Request does not fit the backend.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout waiting for job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// Whether resubmitting the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            HalError::TransientFailure(_) | HalError::BackendUnavailable(_)
        )
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(HalError::TransientFailure("evicted".into()).is_transient());
        assert!(HalError::BackendUnavailable("maintenance".into()).is_transient());
        assert!(!HalError::JobFailed("bad circuit".into()).is_transient());
        assert!(!HalError::JobCancelled.is_transient());
    }
}
