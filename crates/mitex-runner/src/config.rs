//! Experiment configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, a YAML
//! file, `MITEX_*` environment variables and command-line flags (applied by
//! the caller after [`ExperimentConfig::load`]).
//!
//! ```yaml
//! backend: fake_eagle127
//! circuit:
//!   num_qubits: 30
//!   depth: 4
//! reference: 0.1484375
//! configs:
//!   - { name: unmitigated, resilience_level: 0, precision: 0.01 }
//!   - { name: full, resilience_level: 2, precision: 0.01 }
//! ```

use std::path::Path;
use std::time::Duration;

use mitex_compile::MAX_OPTIMIZATION_LEVEL;
use mitex_hal::{BackendConfig, DynamicalDecoupling};
use mitex_ir::Pauli;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ansatz::{CircuitModel, DEFAULT_ANSATZ_SEED};
use crate::binder::{DEFAULT_BINDING_SEED, DEFAULT_PHI_MAX};
use crate::error::{RunError, RunResult};
use crate::mitigation::{ExecutionMode, MAX_ATTEMPTS, MitigationConfig, RetryPolicy};

/// Environment variable overriding [`ExperimentConfig::backend`].
pub const ENV_BACKEND: &str = "MITEX_BACKEND";
/// Environment variable overriding [`BindingSettings::seed`].
pub const ENV_SEED: &str = "MITEX_SEED";
/// Environment variable overriding [`ExperimentConfig::optimization_level`].
pub const ENV_OPTIMIZATION_LEVEL: &str = "MITEX_OPTIMIZATION_LEVEL";
/// Environment variable overriding [`ExperimentConfig::reference`].
pub const ENV_REFERENCE: &str = "MITEX_REFERENCE";

/// Which circuit the experiment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitKind {
    /// Pauli two-design ansatz.
    #[default]
    Ansatz,
    /// Two-qubit Bell circuit.
    Bell,
}

/// Circuit and observable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSettings {
    /// Circuit family.
    #[serde(default)]
    pub kind: CircuitKind,
    /// Register width of the ansatz.
    #[serde(default = "default_num_qubits")]
    pub num_qubits: u32,
    /// Entangling repetitions of the ansatz.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Seed for the ansatz rotation choice.
    #[serde(default = "default_ansatz_seed")]
    pub ansatz_seed: u64,
    /// Observable qubit. Defaults to the second-to-last qubit.
    #[serde(default)]
    pub observable_qubit: Option<u32>,
    /// Observable Pauli label.
    #[serde(default = "default_pauli")]
    pub observable: char,
    /// Observable coefficient.
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
    /// Barriers between ansatz layers.
    #[serde(default = "default_true")]
    pub barriers: bool,
}

/// Parameter binding settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BindingSettings {
    /// Seed of the sampling generator.
    #[serde(default = "default_binding_seed")]
    pub seed: u64,
    /// Half-width of the sampling interval.
    #[serde(default = "default_phi_max")]
    pub phi_max: f64,
}

/// Retry settings, durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Submissions per configuration.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff growth factor.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

/// Job scheduling settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Sequential or concurrent submission.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Per-job timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Retries of transient failures.
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Everything needed to run one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Device name, looked up in the device catalog.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Registered backend implementation that runs the jobs.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider-specific settings, passed through as backend config extras.
    #[serde(default)]
    pub provider_options: serde_json::Map<String, serde_json::Value>,
    /// Circuit settings.
    #[serde(default)]
    pub circuit: CircuitSettings,
    /// Binding settings.
    #[serde(default)]
    pub binding: BindingSettings,
    /// Mapper optimization level.
    #[serde(default = "default_optimization_level")]
    pub optimization_level: u8,
    /// Exact expectation value to compare against.
    #[serde(default)]
    pub reference: Option<f64>,
    /// DD settings shared by every configuration.
    #[serde(default)]
    pub dynamical_decoupling: DynamicalDecoupling,
    /// Mitigation configurations, in report order.
    #[serde(default = "MitigationConfig::defaults")]
    pub configs: Vec<MitigationConfig>,
    /// Scheduling.
    #[serde(default)]
    pub execution: ExecutionSettings,
}

fn default_num_qubits() -> u32 {
    30
}

fn default_depth() -> u32 {
    4
}

fn default_ansatz_seed() -> u64 {
    DEFAULT_ANSATZ_SEED
}

fn default_pauli() -> char {
    'Z'
}

fn default_coefficient() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_binding_seed() -> u64 {
    DEFAULT_BINDING_SEED
}

fn default_phi_max() -> f64 {
    DEFAULT_PHI_MAX
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_backend() -> String {
    "fake_eagle127".into()
}

fn default_provider() -> String {
    "mock".into()
}

fn default_optimization_level() -> u8 {
    1
}

impl Default for CircuitSettings {
    fn default() -> Self {
        Self {
            kind: CircuitKind::default(),
            num_qubits: default_num_qubits(),
            depth: default_depth(),
            ansatz_seed: default_ansatz_seed(),
            observable_qubit: None,
            observable: default_pauli(),
            coefficient: default_coefficient(),
            barriers: default_true(),
        }
    }
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self {
            seed: default_binding_seed(),
            phi_max: default_phi_max(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            timeout_ms: None,
            retry: RetrySettings::default(),
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            provider: default_provider(),
            provider_options: serde_json::Map::new(),
            circuit: CircuitSettings::default(),
            binding: BindingSettings::default(),
            optimization_level: default_optimization_level(),
            reference: None,
            dynamical_decoupling: DynamicalDecoupling::default(),
            configs: MitigationConfig::defaults(),
            execution: ExecutionSettings::default(),
        }
    }
}

impl RetrySettings {
    /// As a runner policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

impl ExecutionSettings {
    /// Per-job timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl CircuitSettings {
    /// The observable Pauli.
    pub fn pauli(&self) -> RunResult<Pauli> {
        Pauli::from_char(self.observable).ok_or_else(|| {
            RunError::Configuration(format!(
                "observable must be one of I, X, Y, Z, got '{}'",
                self.observable
            ))
        })
    }

    /// The ansatz builder these settings describe.
    pub fn model(&self) -> RunResult<CircuitModel> {
        let mut model = CircuitModel::new(self.num_qubits, self.depth)
            .with_ansatz_seed(self.ansatz_seed)
            .with_observable(self.pauli()?, self.coefficient)
            .with_barriers(self.barriers);
        if let Some(q) = self.observable_qubit {
            model = model.with_observable_qubit(q);
        }
        Ok(model)
    }
}

impl ExperimentConfig {
    /// Parse YAML text.
    pub fn from_yaml(text: &str) -> RunResult<Self> {
        serde_yaml_ng::from_str(text)
            .map_err(|e| RunError::Configuration(format!("invalid configuration: {e}")))
    }

    /// Read a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> RunResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RunError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    /// Defaults or `path`, then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> RunResult<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MITEX_*` variables from the process environment.
    pub fn merge_env(self) -> RunResult<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Apply `MITEX_*` variables from `lookup`.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> RunResult<Self> {
        if let Some(v) = lookup(ENV_BACKEND) {
            debug!("{} overrides backend: {}", ENV_BACKEND, v);
            self.backend = v;
        }
        if let Some(v) = lookup(ENV_SEED) {
            self.binding.seed = parse_var(ENV_SEED, &v)?;
        }
        if let Some(v) = lookup(ENV_OPTIMIZATION_LEVEL) {
            self.optimization_level = parse_var(ENV_OPTIMIZATION_LEVEL, &v)?;
        }
        if let Some(v) = lookup(ENV_REFERENCE) {
            self.reference = Some(parse_var(ENV_REFERENCE, &v)?);
        }
        Ok(self)
    }

    /// Reject values no stage could accept.
    pub fn validate(&self) -> RunResult<()> {
        let fail = |msg: String| Err(RunError::Configuration(msg));

        if self.circuit.kind == CircuitKind::Ansatz && self.circuit.num_qubits < 1 {
            return fail("circuit.num_qubits must be at least 1".into());
        }
        self.circuit.pauli()?;
        if !self.binding.phi_max.is_finite() || self.binding.phi_max <= 0.0 {
            return fail(format!(
                "binding.phi_max must be a positive number, got {}",
                self.binding.phi_max
            ));
        }
        if self.optimization_level > MAX_OPTIMIZATION_LEVEL {
            return fail(format!(
                "optimization_level must be 0..={MAX_OPTIMIZATION_LEVEL}, got {}",
                self.optimization_level
            ));
        }
        if let Some(r) = self.reference {
            if !r.is_finite() {
                return fail(format!("reference must be finite, got {r}"));
            }
        }
        if self.configs.is_empty() {
            return fail("at least one mitigation configuration is required".into());
        }
        for config in &self.configs {
            if !config.precision.is_finite() || config.precision <= 0.0 {
                return fail(format!(
                    "configuration '{}': precision must be positive, got {}",
                    config.name, config.precision
                ));
            }
        }
        let mut names: Vec<_> = self.configs.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return fail("mitigation configuration names must be unique".into());
        }
        if !(1..=MAX_ATTEMPTS).contains(&self.execution.retry.max_attempts) {
            return fail(format!(
                "execution.retry.max_attempts must be 1..={MAX_ATTEMPTS}, got {}",
                self.execution.retry.max_attempts
            ));
        }
        if !self.execution.retry.multiplier.is_finite() || self.execution.retry.multiplier < 1.0 {
            return fail(format!(
                "execution.retry.multiplier must be at least 1, got {}",
                self.execution.retry.multiplier
            ));
        }
        if self.execution.timeout_ms == Some(0) {
            return fail("execution.timeout_ms must be positive".into());
        }
        Ok(())
    }

    /// Backend construction settings for the registry.
    pub fn backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::new(&self.provider)
            .with_extra("device", serde_json::Value::String(self.backend.clone()));
        for (key, value) in &self.provider_options {
            config = config.with_extra(key.clone(), value.clone());
        }
        config
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> RunResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RunError::Configuration(format!("{key}={value:?}: {e}")))
}
