//! End-to-end comparison pipeline.
//!
//! ```text
//!   CircuitModel ──→ ParameterBinder ──→ BackendMapper ──→ MitigationRunner ──→ ComparisonReport
//!   (circuit, obs)   (values)            (MappedArtifact)  (one outcome per config)
//! ```
//!
//! Every stage returns a value consumed by the next; nothing is shared
//! between runs except the backend handle.

use std::sync::Arc;

use mitex_hal::Backend;
use mitex_ir::{Circuit, ParameterVector, SparseObservable};
use tracing::{info, instrument, warn};

use crate::ansatz;
use crate::binder::ParameterBinder;
use crate::config::{CircuitKind, ExperimentConfig};
use crate::error::{RunError, RunResult};
use crate::mapper::{BackendMapper, MappedArtifact};
use crate::mitigation::{ConfigOutcome, MitigationRunner};
use crate::report::ComparisonReport;

/// Observable qubit of the Bell circuit when none is configured.
pub const BELL_OBSERVABLE_QUBIT: u32 = 1;

/// Logical circuit, observable and bound values, before mapping.
#[derive(Debug, Clone)]
pub struct LogicalArtifact {
    /// Parameterized circuit.
    pub circuit: Circuit,
    /// Observable on the logical register.
    pub observable: SparseObservable,
    /// One value per circuit parameter.
    pub parameters: ParameterVector,
}

/// Everything one run produced.
#[derive(Debug)]
pub struct ExperimentOutcome {
    /// Mapped circuit and observable the jobs used.
    pub artifact: MappedArtifact,
    /// Bound parameter values.
    pub parameters: ParameterVector,
    /// One outcome per configuration, in configuration order.
    pub outcomes: Vec<ConfigOutcome>,
}

impl ExperimentOutcome {
    /// Compare the outcomes against `reference`.
    pub fn report(&self, reference: f64) -> ComparisonReport {
        ComparisonReport::new(&self.artifact.backend, reference, &self.outcomes)
    }

    /// Number of configurations with a result.
    pub fn num_succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }
}

/// A validated experiment configuration, ready to run.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    /// Validate `config`.
    pub fn new(config: ExperimentConfig) -> RunResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Build the circuit and observable, then bind parameters.
    pub fn prepare(&self) -> RunResult<LogicalArtifact> {
        let (circuit, observable) = self.build_circuit()?;
        let binding = &self.config.binding;
        let parameters = ParameterBinder::new(binding.phi_max)?.bind_seeded(&circuit, binding.seed);
        Ok(LogicalArtifact {
            circuit,
            observable,
            parameters,
        })
    }

    /// Map a prepared artifact onto `backend`'s device.
    pub fn map(&self, logical: &LogicalArtifact, backend: &dyn Backend) -> RunResult<MappedArtifact> {
        let capabilities = backend.capabilities();
        if capabilities.name != self.config.backend {
            warn!(
                "Configured device '{}' differs from backend device '{}', mapping for the latter",
                self.config.backend, capabilities.name
            );
        }
        BackendMapper::new(self.config.optimization_level)?.map(
            &logical.circuit,
            &logical.observable,
            capabilities,
        )
    }

    /// Run every configuration against `backend`.
    pub async fn run(&self, backend: Arc<dyn Backend>) -> RunResult<ExperimentOutcome> {
        self.run_with(backend, &|_| {}).await
    }

    /// [`run`](Self::run), calling `on_done` as each configuration finishes.
    ///
    /// Construction, binding and mapping errors abort the run. Job errors do
    /// not; they are recorded per configuration.
    #[instrument(skip_all, fields(backend = %backend.name(), device = %self.config.backend))]
    pub async fn run_with(
        &self,
        backend: Arc<dyn Backend>,
        on_done: &(dyn Fn(&ConfigOutcome) + Send + Sync),
    ) -> RunResult<ExperimentOutcome> {
        let logical = self.prepare()?;
        let artifact = self.map(&logical, backend.as_ref())?;

        let execution = &self.config.execution;
        let runner = MitigationRunner::new(backend)
            .with_dynamical_decoupling(self.config.dynamical_decoupling)
            .with_retry(execution.retry.policy())
            .with_timeout(execution.timeout())
            .with_mode(execution.mode);
        let outcomes = runner
            .run_with(&artifact, &logical.parameters, &self.config.configs, on_done)
            .await;

        let outcome = ExperimentOutcome {
            artifact,
            parameters: logical.parameters,
            outcomes,
        };
        info!(
            "{}/{} configurations succeeded",
            outcome.num_succeeded(),
            outcome.outcomes.len()
        );
        Ok(outcome)
    }

    fn build_circuit(&self) -> RunResult<(Circuit, SparseObservable)> {
        let settings = &self.config.circuit;
        match settings.kind {
            CircuitKind::Ansatz => settings.model()?.build(),
            CircuitKind::Bell => {
                let circuit = ansatz::bell(false)?;
                let qubit = settings.observable_qubit.unwrap_or(BELL_OBSERVABLE_QUBIT);
                if qubit >= circuit.num_qubits() {
                    return Err(RunError::Configuration(format!(
                        "observable qubit {qubit} is outside the 2-qubit Bell circuit"
                    )));
                }
                let observable = SparseObservable::single(
                    settings.pauli()?,
                    qubit,
                    settings.coefficient,
                    circuit.num_qubits(),
                )
                .map_err(RunError::Circuit)?;
                Ok((circuit, observable))
            }
        }
    }
}
