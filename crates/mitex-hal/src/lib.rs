//! mitex hardware abstraction layer
//!
//! Describes devices and runs estimation jobs on them:
//! - [`Backend`]: device description plus job lifecycle
//!   (`submit` / `status` / `result` / `cancel` / `wait`)
//! - [`Capabilities`], [`GateSet`], [`Topology`]: what the mapper targets
//! - [`DeviceCatalog`]: built-in device descriptions by name
//! - [`EstimatorPub`], [`EstimatorOptions`], [`EstimatorResult`]: what goes in
//!   and what comes out of one job
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use mitex_hal::{
//!     Backend, BackendAvailability, Capabilities, EstimatorOptions, EstimatorPub,
//!     EstimatorResult, HalResult, JobId, JobStatus, ValidationResult, validate_request,
//! };
//! use async_trait::async_trait;
//!
//! struct MyBackend {
//!     capabilities: Capabilities,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!     fn capabilities(&self) -> &Capabilities { &self.capabilities }
//!
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!
//!     async fn validate(&self, request: &EstimatorPub) -> HalResult<ValidationResult> {
//!         Ok(validate_request(&self.capabilities, request))
//!     }
//!
//!     async fn submit(&self, request: &EstimatorPub, options: &EstimatorOptions) -> HalResult<JobId> {
//!         todo!()
//!     }
//!
//!     async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> { todo!() }
//!     async fn result(&self, job_id: &JobId) -> HalResult<EstimatorResult> { todo!() }
//!     async fn cancel(&self, job_id: &JobId) -> HalResult<()> { todo!() }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod catalog;
pub mod error;
pub mod estimator;
pub mod job;
pub mod registry;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, DEFAULT_POLL_INTERVAL, MAX_POLLS,
    ValidationResult, validate_request,
};
pub use capability::{Capabilities, GateSet, Topology, TopologyKind};
pub use catalog::DeviceCatalog;
pub use error::{HalError, HalResult};
pub use estimator::{
    DdSequence, DynamicalDecoupling, EstimatorOptions, EstimatorPub, EstimatorResult,
    ResilienceLevel,
};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
