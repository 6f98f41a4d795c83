//! Backend trait and configuration.
//!
//! The [`Backend`] trait describes a device and runs estimation jobs on it:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! `capabilities()` is synchronous: a backend that cannot describe itself
//! without I/O is not initialised. Everything that touches the job service
//! is async, and implementations are `Send + Sync` so one handle can be
//! shared as `Arc<dyn Backend>` across concurrent submissions.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::estimator::{EstimatorOptions, EstimatorPub, EstimatorResult};
use crate::job::{JobId, JobStatus};

/// Default interval between status polls in [`Backend::wait`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Polls before [`Backend::wait`] gives up.
pub const MAX_POLLS: u32 = 600;

/// Configuration used to construct a backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend or device name.
    pub name: String,
    /// Service endpoint, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Access token. Never serialized.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Backend-specific settings.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Configuration for a named backend.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add a backend-specific setting.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// A device description plus an estimation job service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Name of the backend.
    fn name(&self) -> &str;

    /// Device description used by the mapper.
    fn capabilities(&self) -> &Capabilities;

    /// Whether the backend currently accepts jobs.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Check a request against the device without submitting it.
    async fn validate(&self, request: &EstimatorPub) -> HalResult<ValidationResult>;

    /// Submit one estimation request.
    async fn submit(&self, request: &EstimatorPub, options: &EstimatorOptions)
    -> HalResult<JobId>;

    /// Current status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<EstimatorResult>;

    /// Cancel a job. Cancelling a terminal job is a no-op.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Interval between status polls in [`Backend::wait`].
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Poll until the job is terminal and return its result.
    async fn wait(&self, job_id: &JobId) -> HalResult<EstimatorResult> {
        let poll_interval = self.poll_interval();

        for _ in 0..MAX_POLLS {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Interrupted(msg) => return Err(HalError::TransientFailure(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.to_string()))
    }
}

/// Backend availability snapshot.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether jobs are accepted.
    pub is_available: bool,
    /// Jobs ahead in the queue, if known.
    pub queue_depth: Option<u32>,
    /// Expected wait before a new job starts, if known.
    pub estimated_wait: Option<Duration>,
    /// Human-readable status.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// An idle backend.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// A backend that is down.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Outcome of [`Backend::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// The request can be submitted as is.
    Valid,
    /// The request can never run on this backend.
    Invalid {
        /// Why.
        reasons: Vec<String>,
    },
    /// The circuit must be mapped to the device first.
    RequiresMapping {
        /// What is not native.
        details: String,
    },
}

impl ValidationResult {
    /// Whether the request is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Check a request against a device description.
///
/// Structural problems (parameter count, observable width, measurements, too
/// many qubits) are `Invalid`. Non-native gates or uncoupled two-qubit
/// operands are `RequiresMapping`.
pub fn validate_request(capabilities: &Capabilities, request: &EstimatorPub) -> ValidationResult {
    let mut reasons = Vec::new();
    if let Err(e) = request.validate() {
        reasons.push(e.to_string());
    }
    if request.circuit.num_qubits() > capabilities.num_qubits {
        reasons.push(format!(
            "circuit uses {} qubits, {} has {}",
            request.circuit.num_qubits(),
            capabilities.name,
            capabilities.num_qubits
        ));
    }
    if !reasons.is_empty() {
        return ValidationResult::Invalid { reasons };
    }

    for inst in request.circuit.instructions() {
        if inst.is_barrier() {
            continue;
        }
        if !capabilities.gate_set.is_native(inst.name()) {
            return ValidationResult::RequiresMapping {
                details: format!("gate '{}' is not native on {}", inst.name(), capabilities.name),
            };
        }
        if inst.is_two_qubit_gate() {
            let (a, b) = (inst.qubits[0].0, inst.qubits[1].0);
            if !capabilities.topology.is_connected(a, b) {
                return ValidationResult::RequiresMapping {
                    details: format!("qubits {a} and {b} are not coupled on {}", capabilities.name),
                };
            }
        }
    }
    ValidationResult::Valid
}

/// Factory trait for constructing backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Build a backend.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitex_ir::{Circuit, ParameterVector, Pauli, QubitId, SparseObservable};

    fn request(circuit: Circuit) -> EstimatorPub {
        let n = circuit.num_qubits();
        let observable = SparseObservable::single(Pauli::Z, 0, 1.0, n).unwrap();
        EstimatorPub::new(circuit, observable, ParameterVector::empty())
    }

    #[test]
    fn test_backend_config_redacts_token() {
        let config = BackendConfig::new("mock")
            .with_token("secret-token")
            .with_extra("latency_ms", serde_json::json!(5));
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(config.extra.contains_key("latency_ms"));
        assert!(!serde_json::to_string(&config).unwrap().contains("secret-token"));
    }

    #[test]
    fn test_backend_availability() {
        assert!(BackendAvailability::always_available().is_available);
        let down = BackendAvailability::unavailable("maintenance");
        assert!(!down.is_available);
        assert_eq!(down.status_message.as_deref(), Some("maintenance"));
    }

    #[test]
    fn test_validate_request_native_and_coupled() {
        let caps = Capabilities::iqm("fake_iqm5", 5);
        let mut circuit = Circuit::new("native", 5);
        circuit.prx(0.5, 0.0, QubitId(0)).unwrap();
        circuit.cz(QubitId(0), QubitId(3)).unwrap();
        assert!(validate_request(&caps, &request(circuit)).is_valid());
    }

    #[test]
    fn test_validate_request_needs_mapping() {
        let caps = Capabilities::iqm("fake_iqm5", 5);
        let mut circuit = Circuit::new("logical", 5);
        circuit.cz(QubitId(1), QubitId(2)).unwrap();
        assert!(matches!(
            validate_request(&caps, &request(circuit)),
            ValidationResult::RequiresMapping { .. }
        ));

        let bell = Circuit::bell().unwrap();
        assert!(matches!(
            validate_request(&caps, &request(bell)),
            ValidationResult::RequiresMapping { .. }
        ));
    }

    #[test]
    fn test_validate_request_too_wide() {
        let caps = Capabilities::iqm("fake_iqm5", 5);
        let result = validate_request(&caps, &request(Circuit::new("wide", 7)));
        assert!(matches!(result, ValidationResult::Invalid { .. }));
    }
}
