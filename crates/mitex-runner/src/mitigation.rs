//! Estimation jobs across mitigation configurations.
//!
//! One job per [`MitigationConfig`]. Each job moves through
//!
//! ```text
//!   submit ──→ SUBMITTED ──→ COMPLETED
//!                 │
//!                 ├──→ FAILED     (transient failures retried with backoff)
//!                 │
//!                 └──→ TIMED_OUT  (cancelled on the backend)
//! ```
//!
//! Outcomes are returned in configuration order whatever the execution mode,
//! and a failed configuration never discards the others.

use std::sync::Arc;
use std::time::Duration;

use mitex_hal::{
    Backend, DynamicalDecoupling, EstimatorOptions, EstimatorPub, EstimatorResult, HalError,
    JobId, ResilienceLevel,
};
use mitex_ir::ParameterVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{RunError, RunResult};
use crate::mapper::MappedArtifact;

/// Default target precision of every preset.
pub const DEFAULT_PRECISION: f64 = 1e-2;

/// A named mitigation setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationConfig {
    /// Label used in reports.
    pub name: String,
    /// Mitigation intensity.
    pub resilience_level: ResilienceLevel,
    /// Target standard error.
    pub precision: f64,
}

impl MitigationConfig {
    /// A configuration.
    pub fn new(name: impl Into<String>, resilience_level: ResilienceLevel, precision: f64) -> Self {
        Self {
            name: name.into(),
            resilience_level,
            precision,
        }
    }

    /// Level 0.
    pub fn unmitigated() -> Self {
        Self::new("unmitigated", ResilienceLevel::None, DEFAULT_PRECISION)
    }

    /// Level 1.
    pub fn moderate() -> Self {
        Self::new("moderate", ResilienceLevel::Moderate, DEFAULT_PRECISION)
    }

    /// Level 2.
    pub fn full() -> Self {
        Self::new("full", ResilienceLevel::Full, DEFAULT_PRECISION)
    }

    /// `unmitigated`, `moderate`, `full`.
    pub fn defaults() -> Vec<Self> {
        vec![Self::unmitigated(), Self::moderate(), Self::full()]
    }

    /// Backend options for this configuration.
    pub fn options(&self, dynamical_decoupling: DynamicalDecoupling) -> EstimatorOptions {
        EstimatorOptions::new(self.resilience_level, self.precision)
            .with_dynamical_decoupling(dynamical_decoupling)
    }
}

/// Estimate and standard error of one finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Expectation value.
    pub estimate: f64,
    /// Standard error.
    pub std_error: f64,
    /// Backend job identifier.
    pub job_id: JobId,
    /// Submissions it took, retries included.
    pub attempts: u32,
}

/// Result of one configuration.
#[derive(Debug)]
pub struct ConfigOutcome {
    /// The configuration.
    pub config: MitigationConfig,
    /// Its job result or the error that prevented one.
    pub outcome: RunResult<JobResult>,
}

impl ConfigOutcome {
    /// The result, if the job succeeded.
    pub fn result(&self) -> Option<&JobResult> {
        self.outcome.as_ref().ok()
    }

    /// Whether the job produced a result.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Upper bound on [`RetryPolicy::max_attempts`] accepted from configuration.
pub const MAX_ATTEMPTS: u32 = 20;

/// Resubmission of transiently failed jobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Submissions per configuration, first one included.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any wait.
    pub max_backoff: Duration,
    /// Growth factor between waits.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Submit once, never retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (1-based), never above `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.max(1.0).powi(exponent);
        // Capped in f64 so an overflowing factor never reaches `Duration`.
        let nanos = self.initial_backoff.as_nanos() as f64 * factor;
        if nanos >= self.max_backoff.as_nanos() as f64 {
            return self.max_backoff;
        }
        Duration::from_nanos(nanos as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// How configurations are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One job at a time, in configuration order.
    #[default]
    Sequential,
    /// All jobs in flight together.
    Concurrent,
}

/// Runs one mapped artifact under several mitigation configurations.
pub struct MitigationRunner {
    backend: Arc<dyn Backend>,
    dynamical_decoupling: DynamicalDecoupling,
    retry: RetryPolicy,
    timeout: Option<Duration>,
    mode: ExecutionMode,
}

impl MitigationRunner {
    /// A sequential runner with default retries, no timeout and DD on.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            dynamical_decoupling: DynamicalDecoupling::default(),
            retry: RetryPolicy::default(),
            timeout: None,
            mode: ExecutionMode::Sequential,
        }
    }

    /// DD settings shared by every configuration.
    pub fn with_dynamical_decoupling(mut self, dd: DynamicalDecoupling) -> Self {
        self.dynamical_decoupling = dd;
        self
    }

    /// Retry policy for transient failures.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Per-job timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Scheduling mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// The backend jobs go to.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// One outcome per configuration, in configuration order.
    pub async fn run(
        &self,
        artifact: &MappedArtifact,
        parameters: &ParameterVector,
        configs: &[MitigationConfig],
    ) -> Vec<ConfigOutcome> {
        self.run_with(artifact, parameters, configs, &|_| {}).await
    }

    /// [`run`](Self::run), calling `on_done` as each configuration finishes.
    #[instrument(skip_all, fields(backend = %self.backend.name(), configs = configs.len()))]
    pub async fn run_with(
        &self,
        artifact: &MappedArtifact,
        parameters: &ParameterVector,
        configs: &[MitigationConfig],
        on_done: &(dyn Fn(&ConfigOutcome) + Send + Sync),
    ) -> Vec<ConfigOutcome> {
        info!("Running {} configurations ({:?})", configs.len(), self.mode);

        let finish = |config: &MitigationConfig, outcome: RunResult<JobResult>| {
            let done = ConfigOutcome {
                config: config.clone(),
                outcome,
            };
            on_done(&done);
            done
        };

        match self.mode {
            ExecutionMode::Sequential => {
                let mut outcomes = Vec::with_capacity(configs.len());
                for config in configs {
                    let outcome = self.run_one(artifact, parameters, config).await;
                    outcomes.push(finish(config, outcome));
                }
                outcomes
            }
            ExecutionMode::Concurrent => {
                let jobs = configs.iter().map(|config| async move {
                    let outcome = self.run_one(artifact, parameters, config).await;
                    finish(config, outcome)
                });
                futures::future::join_all(jobs).await
            }
        }
    }

    #[instrument(skip(self, artifact, parameters), fields(config = %config.name))]
    async fn run_one(
        &self,
        artifact: &MappedArtifact,
        parameters: &ParameterVector,
        config: &MitigationConfig,
    ) -> RunResult<JobResult> {
        let options = config.options(self.dynamical_decoupling);
        self.check(artifact, parameters, config, &options)?;

        let request = EstimatorPub::new(
            artifact.circuit.clone(),
            artifact.observable.clone(),
            parameters.clone(),
        );
        let job_error = |source: HalError| RunError::Job {
            backend: self.backend.name().to_string(),
            config: config.name.clone(),
            source,
        };

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let error = match self.backend.submit(&request, &options).await {
                Ok(job_id) => match self.await_job(&job_id, config).await? {
                    Ok(result) => {
                        info!(
                            "{}: {:.6} +/- {:.6} (job {}, attempt {})",
                            config.name, result.evs, result.stds, job_id, attempt
                        );
                        return Ok(JobResult {
                            estimate: result.evs,
                            std_error: result.stds,
                            job_id,
                            attempts: attempt,
                        });
                    }
                    Err(e) => e,
                },
                Err(e) => e,
            };

            if !error.is_transient() || attempt >= max_attempts {
                warn!("{} failed after {} attempt(s): {}", config.name, attempt, error);
                return Err(job_error(error));
            }

            let backoff = self.retry.backoff(attempt);
            warn!(
                attempt = attempt + 1,
                "Retrying {} after transient failure (backoff {:?}): {}",
                config.name,
                backoff,
                error
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    /// Wait for a job. The outer error is a timeout, the inner one a backend
    /// failure that may be retried.
    async fn await_job(
        &self,
        job_id: &JobId,
        config: &MitigationConfig,
    ) -> RunResult<Result<EstimatorResult, HalError>> {
        let Some(timeout) = self.timeout else {
            return Ok(self.backend.wait(job_id).await);
        };

        match tokio::time::timeout(timeout, self.backend.wait(job_id)).await {
            Ok(result) => Ok(result),
            Err(_) => {
                warn!("Job {} exceeded {:?}, cancelling", job_id, timeout);
                if let Err(e) = self.backend.cancel(job_id).await {
                    warn!("Cancelling job {} failed: {}", job_id, e);
                }
                Err(RunError::TimedOut {
                    backend: self.backend.name().to_string(),
                    config: config.name.clone(),
                    timeout,
                })
            }
        }
    }

    fn check(
        &self,
        artifact: &MappedArtifact,
        parameters: &ParameterVector,
        config: &MitigationConfig,
        options: &EstimatorOptions,
    ) -> RunResult<()> {
        options
            .validate()
            .map_err(|e| RunError::Configuration(format!("{}: {e}", config.name)))?;
        if parameters.len() != artifact.circuit.num_parameters() {
            return Err(RunError::Configuration(format!(
                "{}: {} parameter values for a circuit with {} parameters",
                config.name,
                parameters.len(),
                artifact.circuit.num_parameters()
            )));
        }
        if artifact.circuit.has_measurements() {
            return Err(RunError::Configuration(format!(
                "{}: estimator circuits must not contain measurements",
                config.name
            )));
        }
        debug!("{} passed pre-submission checks", config.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let configs = MitigationConfig::defaults();
        let names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["unmitigated", "moderate", "full"]);
        assert!(configs.iter().all(|c| c.precision == DEFAULT_PRECISION));

        let opts = configs[2].options(DynamicalDecoupling::default());
        assert_eq!(opts.resilience_level, ResilienceLevel::Full);
        assert!(opts.dynamical_decoupling.enable);
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            multiplier: 2.0,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }

    #[test]
    fn test_backoff_saturates_at_large_retry_counts() {
        let policy = RetryPolicy::default();
        for retry in [31, 64, 100, 1100, u32::MAX] {
            assert_eq!(policy.backoff(retry), Duration::from_secs(30));
        }

        let steep = RetryPolicy {
            multiplier: 1e300,
            ..RetryPolicy::default()
        };
        assert_eq!(steep.backoff(3), Duration::from_secs(30));

        let immediate = RetryPolicy {
            initial_backoff: Duration::ZERO,
            ..RetryPolicy::default()
        };
        assert_eq!(immediate.backoff(5000), Duration::ZERO);
    }

    #[test]
    fn test_execution_mode_serde() {
        let mode: ExecutionMode = serde_json::from_str("\"concurrent\"").unwrap();
        assert_eq!(mode, ExecutionMode::Concurrent);
    }
}
