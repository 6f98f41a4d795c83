//! Error types for the runner crate.

use std::fmt;
use std::time::Duration;

use mitex_compile::CompileError;
use mitex_hal::HalError;
use mitex_ir::IrError;
use thiserror::Error;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building the circuit and observable, or validating inputs.
    Construction,
    /// Producing or applying parameter values.
    Binding,
    /// Mapping onto the device.
    Mapping,
    /// Submitting or waiting for an estimation job.
    Submission,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Construction => write!(f, "circuit construction"),
            Stage::Binding => write!(f, "binding"),
            Stage::Mapping => write!(f, "mapping"),
            Stage::Submission => write!(f, "job submission"),
        }
    }
}

/// Errors raised while running an experiment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// Invalid inputs. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Circuit construction failed in the IR.
    #[error("Circuit construction failed")]
    Circuit(#[source] IrError),

    /// Parameter values could not be applied.
    #[error("Binding parameters to '{circuit}' failed")]
    Binding {
        /// Circuit name.
        circuit: String,
        /// Underlying error.
        #[source]
        source: IrError,
    },

    /// No valid embedding on the device. Never retried.
    #[error("Mapping onto '{backend}' failed")]
    Mapping {
        /// Device name.
        backend: String,
        /// Underlying error.
        #[source]
        source: CompileError,
    },

    /// The backend rejected or failed the job.
    #[error("Job for configuration '{config}' on '{backend}' failed")]
    Job {
        /// Backend name.
        backend: String,
        /// Mitigation configuration name.
        config: String,
        /// Underlying error.
        #[source]
        source: HalError,
    },

    /// The job outlived the per-job timeout and was cancelled.
    #[error("Job for configuration '{config}' on '{backend}' timed out after {timeout:?}")]
    TimedOut {
        /// Backend name.
        backend: String,
        /// Mitigation configuration name.
        config: String,
        /// The timeout that expired.
        timeout: Duration,
    },

    /// Report export failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Stage the error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            RunError::Configuration(_)
            | RunError::Circuit(_)
            | RunError::Serialization(_)
            | RunError::Io(_) => Stage::Construction,
            RunError::Binding { .. } => Stage::Binding,
            RunError::Mapping { .. } => Stage::Mapping,
            RunError::Job { .. } | RunError::TimedOut { .. } => Stage::Submission,
        }
    }

    /// Whether retrying the job may help.
    pub fn is_transient(&self) -> bool {
        matches!(self, RunError::Job { source, .. } if source.is_transient())
    }
}

/// Result type for runner operations.
pub type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_transience() {
        let job = RunError::Job {
            backend: "mock".into(),
            config: "moderate".into(),
            source: HalError::TransientFailure("evicted".into()),
        };
        assert_eq!(job.stage(), Stage::Submission);
        assert!(job.is_transient());
        assert_eq!(
            job.to_string(),
            "Job for configuration 'moderate' on 'mock' failed"
        );

        let cfg = RunError::Configuration("num_qubits must be at least 1".into());
        assert_eq!(cfg.stage(), Stage::Construction);
        assert!(!cfg.is_transient());
        assert_eq!(Stage::Mapping.to_string(), "mapping");
    }
}
