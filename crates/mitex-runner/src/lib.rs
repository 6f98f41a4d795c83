//! mitex experiment runner
//!
//! Builds an ansatz and its observable, binds parameters from a seeded
//! generator, maps both onto a device and estimates the observable under
//! several error-mitigation configurations:
//! - [`CircuitModel`]: ansatz circuit plus single-term observable
//! - [`ParameterBinder`]: reproducible parameter values
//! - [`BackendMapper`]: device-native circuit with a relabeled observable
//! - [`MitigationRunner`]: one job per [`MitigationConfig`], retries and timeouts
//! - [`ComparisonReport`]: estimates against a reference value
//!
//! [`Experiment`] chains the stages from an [`ExperimentConfig`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mitex_adapter_mock::MockBackend;
//! use mitex_runner::{Experiment, ExperimentConfig};
//!
//! let mut config = ExperimentConfig::default();
//! config.backend = "ideal_simulator".into();
//! config.circuit.num_qubits = 4;
//!
//! let outcome = Experiment::new(config)?.run(Arc::new(MockBackend::new())).await?;
//! println!("{}", outcome.report(0.1484375));
//! ```

pub mod ansatz;
pub mod binder;
pub mod config;
pub mod error;
pub mod experiment;
pub mod mapper;
pub mod mitigation;
pub mod report;

pub use ansatz::{CircuitModel, DEFAULT_ANSATZ_SEED};
pub use binder::{DEFAULT_BINDING_SEED, DEFAULT_PHI_MAX, ParameterBinder};
pub use config::{CircuitKind, ExperimentConfig};
pub use error::{RunError, RunResult, Stage};
pub use experiment::{Experiment, ExperimentOutcome, LogicalArtifact};
pub use mapper::{BackendMapper, MappedArtifact};
pub use mitigation::{
    ConfigOutcome, DEFAULT_PRECISION, ExecutionMode, JobResult, MAX_ATTEMPTS, MitigationConfig,
    MitigationRunner, RetryPolicy,
};
pub use report::{ComparisonReport, ComparisonRow, MissingConfig};
