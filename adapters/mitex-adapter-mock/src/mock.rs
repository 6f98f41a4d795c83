//! Mock backend implementation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use mitex_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, DeviceCatalog,
    EstimatorOptions, EstimatorPub, EstimatorResult, HalError, HalResult, Job, JobId, JobStatus,
    ResilienceLevel, ValidationResult, validate_request,
};

/// How the mock answers a job that has no level-specific result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockResponse {
    /// The same result for every job.
    Fixed(EstimatorResult),
    /// A noisy device: the estimate keeps `retained[level]` of the ideal
    /// value and the standard error equals the requested precision.
    Attenuated {
        /// Noise-free expectation value.
        ideal: f64,
        /// Fraction of the signal surviving at resilience levels 0, 1, 2.
        retained: [f64; 3],
    },
}

impl MockResponse {
    /// Attenuation typical of a mid-size superconducting device.
    pub fn attenuated(ideal: f64) -> Self {
        MockResponse::Attenuated {
            ideal,
            retained: [0.62, 0.88, 0.97],
        }
    }

    fn evaluate(&self, options: &EstimatorOptions) -> EstimatorResult {
        match *self {
            MockResponse::Fixed(result) => result,
            MockResponse::Attenuated { ideal, retained } => EstimatorResult::new(
                ideal * retained[usize::from(options.resilience_level.as_u8())],
                options.default_precision,
            ),
        }
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        MockResponse::Fixed(EstimatorResult::new(0.0, 0.01))
    }
}

/// A scripted failure for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// `submit` is rejected with a transient error.
    Transient(String),
    /// The job is accepted and ends `Failed`.
    Permanent(String),
    /// The job is accepted and ends `Interrupted`, so it may be resubmitted.
    Interrupted(String),
}

enum Outcome {
    Success(EstimatorResult),
    Failure(String),
    Interruption(String),
}

struct MockJob {
    job: Job,
    ready_at: Instant,
    outcome: Outcome,
}

/// Deterministic estimation backend.
///
/// A job is forgotten once its terminal state has been handed out: by
/// `result()` for completed jobs, by `status()` for failed or interrupted
/// ones, and on `cancel()`.
pub struct MockBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    response: MockResponse,
    level_responses: FxHashMap<ResilienceLevel, EstimatorResult>,
    failures: FxHashMap<u32, MockFailure>,
    latency: Duration,
    poll_interval: Duration,
    available: bool,
    submissions: AtomicU32,
    cancelled: AtomicU32,
    jobs: Arc<Mutex<FxHashMap<String, MockJob>>>,
    history: Mutex<Vec<EstimatorOptions>>,
}

impl MockBackend {
    /// Mock of the ideal simulator returning `0.0 +/- 0.01`.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::simulator(
            "ideal_simulator",
            mitex_hal::catalog::IDEAL_SIMULATOR_QUBITS,
        ))
    }

    /// Mock of a catalog device.
    pub fn for_device(name: &str) -> HalResult<Self> {
        Ok(Self::with_capabilities(DeviceCatalog::builtin().describe(name)?))
    }

    /// Mock with explicit capabilities.
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            config: BackendConfig::new(format!("mock:{}", capabilities.name)),
            capabilities,
            response: MockResponse::default(),
            level_responses: FxHashMap::default(),
            failures: FxHashMap::default(),
            latency: Duration::ZERO,
            poll_interval: Duration::from_millis(10),
            available: true,
            submissions: AtomicU32::new(0),
            cancelled: AtomicU32::new(0),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Answer every job with `result` unless a level override matches.
    pub fn with_default_result(self, result: EstimatorResult) -> Self {
        self.with_response(MockResponse::Fixed(result))
    }

    /// Replace the fallback response.
    pub fn with_response(mut self, response: MockResponse) -> Self {
        self.response = response;
        self
    }

    /// Fixed result for one resilience level.
    pub fn with_level_response(mut self, level: ResilienceLevel, result: EstimatorResult) -> Self {
        self.level_responses.insert(level, result);
        self
    }

    /// Make the `index`-th call to `submit` (0-based) fail.
    pub fn fail_submission(mut self, index: u32, failure: MockFailure) -> Self {
        self.failures.insert(index, failure);
        self
    }

    /// Keep jobs `Running` for this long after submission.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Interval used by [`Backend::wait`].
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Report the backend as down.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Number of `submit` calls so far, rejected ones included.
    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Options of every accepted job, in submission order.
    pub fn submitted_options(&self) -> Vec<EstimatorOptions> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of jobs cancelled so far.
    pub fn cancelled(&self) -> u32 {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of jobs whose outcome has not been collected yet.
    pub fn tracked_jobs(&self) -> usize {
        self.lock_jobs().len()
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, MockJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(&self, options: &EstimatorOptions) -> EstimatorResult {
        self.level_responses
            .get(&options.resilience_level)
            .copied()
            .unwrap_or_else(|| self.response.evaluate(options))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        if self.available {
            Ok(BackendAvailability::always_available())
        } else {
            Ok(BackendAvailability::unavailable("mock backend switched off"))
        }
    }

    async fn validate(&self, request: &EstimatorPub) -> HalResult<ValidationResult> {
        Ok(validate_request(&self.capabilities, request))
    }

    #[instrument(skip(self, request, options), fields(backend = %self.config.name))]
    async fn submit(&self, request: &EstimatorPub, options: &EstimatorOptions) -> HalResult<JobId> {
        let index = self.submissions.fetch_add(1, Ordering::SeqCst);

        if !self.available {
            return Err(HalError::BackendUnavailable(self.config.name.clone()));
        }
        options.validate()?;
        match validate_request(&self.capabilities, request) {
            ValidationResult::Valid => {}
            ValidationResult::Invalid { reasons } => {
                return Err(HalError::InvalidRequest(reasons.join("; ")));
            }
            ValidationResult::RequiresMapping { details } => {
                return Err(HalError::InvalidRequest(details));
            }
        }

        let outcome = match self.failures.get(&index) {
            Some(MockFailure::Transient(reason)) => {
                debug!("Rejecting submission {} (transient): {}", index, reason);
                return Err(HalError::TransientFailure(reason.clone()));
            }
            Some(MockFailure::Permanent(reason)) => Outcome::Failure(reason.clone()),
            Some(MockFailure::Interrupted(reason)) => Outcome::Interruption(reason.clone()),
            None => Outcome::Success(self.respond(options)),
        };

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), self.config.name.clone());
        job.transition(JobStatus::Running);

        self.lock_jobs().insert(
            job_id.0.clone(),
            MockJob {
                job,
                ready_at: Instant::now() + self.latency,
                outcome,
            },
        );
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*options);

        debug!(
            "Submitted job {} (resilience {}, precision {})",
            job_id, options.resilience_level, options.default_precision
        );
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let mut jobs = self.lock_jobs();
        let mock = jobs
            .get_mut(job_id.as_str())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;

        if !mock.job.status.is_terminal() && Instant::now() >= mock.ready_at {
            let next = match &mock.outcome {
                Outcome::Success(_) => JobStatus::Completed,
                Outcome::Failure(reason) => JobStatus::Failed(reason.clone()),
                Outcome::Interruption(reason) => JobStatus::Interrupted(reason.clone()),
            };
            mock.job.transition(next);
        }

        let status = mock.job.status.clone();
        if matches!(status, JobStatus::Failed(_) | JobStatus::Interrupted(_)) {
            jobs.remove(job_id.as_str());
        }
        Ok(status)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<EstimatorResult> {
        let mut jobs = self.lock_jobs();
        let mock = jobs
            .get(job_id.as_str())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;

        let result = match (&mock.job.status, &mock.outcome) {
            (JobStatus::Completed, Outcome::Success(result)) => Ok(*result),
            (JobStatus::Failed(reason), _) => Err(HalError::JobFailed(reason.clone())),
            (JobStatus::Interrupted(reason), _) => {
                Err(HalError::TransientFailure(reason.clone()))
            }
            (status, _) => {
                return Err(HalError::Backend(format!(
                    "job {job_id} has no result yet ({status})"
                )));
            }
        };
        jobs.remove(job_id.as_str());
        result
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut mock = self
            .lock_jobs()
            .remove(job_id.as_str())
            .ok_or_else(|| HalError::JobNotFound(job_id.to_string()))?;
        if mock.job.transition(JobStatus::Cancelled) {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
            debug!("Cancelled job {}", job_id);
        }
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl BackendFactory for MockBackend {
    /// Recognised `extra` keys: `device` (catalog name), `latency_ms`,
    /// `evs` + `stds` (fixed response) or `ideal` (attenuated response).
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let device = config
            .extra
            .get("device")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("ideal_simulator");
        let mut backend = Self::for_device(device)?;

        if let Some(ms) = config.extra.get("latency_ms").and_then(serde_json::Value::as_u64) {
            backend.latency = Duration::from_millis(ms);
        }

        let number = |key: &str| config.extra.get(key).and_then(serde_json::Value::as_f64);
        match (number("evs"), number("stds"), number("ideal")) {
            (Some(evs), Some(stds), _) => {
                backend.response = MockResponse::Fixed(EstimatorResult::new(evs, stds));
            }
            (_, _, Some(ideal)) => backend.response = MockResponse::attenuated(ideal),
            (None, None, None) => {}
            _ => {
                return Err(HalError::Configuration(
                    "mock backend needs both 'evs' and 'stds' for a fixed response".into(),
                ));
            }
        }

        backend.config = config;
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitex_ir::{Circuit, ParameterVector, Pauli, SparseObservable};

    fn bell_request() -> EstimatorPub {
        EstimatorPub::new(
            Circuit::bell().unwrap(),
            SparseObservable::single(Pauli::Z, 1, 1.0, 2).unwrap(),
            ParameterVector::empty(),
        )
    }

    fn options(level: ResilienceLevel) -> EstimatorOptions {
        EstimatorOptions::new(level, 1e-2)
    }

    #[tokio::test]
    async fn test_default_response() {
        let backend = MockBackend::new();
        let job = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap();
        assert_eq!(backend.status(&job).await.unwrap(), JobStatus::Completed);
        assert_eq!(backend.result(&job).await.unwrap(), EstimatorResult::new(0.0, 0.01));
        assert_eq!(backend.submissions(), 1);
    }

    #[tokio::test]
    async fn test_level_override_and_attenuation() {
        let backend = MockBackend::new()
            .with_response(MockResponse::attenuated(0.5))
            .with_level_response(ResilienceLevel::Full, EstimatorResult::new(0.49, 0.02));

        let j0 = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap();
        let j2 = backend.submit(&bell_request(), &options(ResilienceLevel::Full)).await.unwrap();

        let r0 = backend.wait(&j0).await.unwrap();
        assert!((r0.evs - 0.31).abs() < 1e-12);
        assert_eq!(r0.stds, 1e-2);
        assert_eq!(backend.wait(&j2).await.unwrap(), EstimatorResult::new(0.49, 0.02));
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let backend = MockBackend::new()
            .fail_submission(0, MockFailure::Transient("queue evicted".into()))
            .fail_submission(1, MockFailure::Permanent("readout error".into()));

        let err = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap_err();
        assert!(err.is_transient());

        let job = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap();
        let err = backend.wait(&job).await.unwrap_err();
        assert!(matches!(err, HalError::JobFailed(ref m) if m == "readout error"));
        assert!(!err.is_transient());

        assert!(backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.is_ok());
        assert_eq!(backend.submissions(), 3);
        assert_eq!(backend.submitted_options().len(), 2);
    }

    #[tokio::test]
    async fn test_interrupted_job_fails_transiently() {
        let backend =
            MockBackend::new().fail_submission(0, MockFailure::Interrupted("preempted".into()));

        let job = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap();
        let err = backend.wait(&job).await.unwrap_err();
        assert!(matches!(err, HalError::TransientFailure(ref m) if m == "preempted"));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_finished_jobs_are_forgotten() {
        let backend = MockBackend::new()
            .fail_submission(1, MockFailure::Permanent("readout error".into()))
            .fail_submission(2, MockFailure::Interrupted("preempted".into()));

        for _ in 0..3 {
            let job = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap();
            let _ = backend.wait(&job).await;
        }
        assert_eq!(backend.tracked_jobs(), 0);

        let job = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap();
        assert_eq!(backend.tracked_jobs(), 1);
        backend.wait(&job).await.unwrap();
        assert!(matches!(backend.result(&job).await, Err(HalError::JobNotFound(_))));
        assert_eq!(backend.tracked_jobs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_and_cancel() {
        let backend = MockBackend::new().with_latency(Duration::from_secs(5));
        let job = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap();
        assert_eq!(backend.status(&job).await.unwrap(), JobStatus::Running);

        backend.cancel(&job).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(matches!(backend.status(&job).await, Err(HalError::JobNotFound(_))));
        assert_eq!(backend.cancelled(), 1);
        assert_eq!(backend.tracked_jobs(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unmapped_or_measured_circuits() {
        let backend = MockBackend::for_device("fake_iqm5").unwrap();
        let err = backend.submit(&bell_request(), &options(ResilienceLevel::None)).await.unwrap_err();
        assert!(matches!(err, HalError::InvalidRequest(_)));

        let mut measured = bell_request();
        measured.circuit.measure_all().unwrap();
        let err = MockBackend::new()
            .submit(&measured, &options(ResilienceLevel::None))
            .await
            .unwrap_err();
        assert!(matches!(err, HalError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = MockBackend::new();
        let missing = JobId::new("nope");
        assert!(matches!(backend.status(&missing).await, Err(HalError::JobNotFound(_))));
        assert!(matches!(backend.cancel(&missing).await, Err(HalError::JobNotFound(_))));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("mock")
            .with_extra("device", serde_json::json!("fake_falcon27"))
            .with_extra("evs", serde_json::json!(0.1))
            .with_extra("stds", serde_json::json!(0.02))
            .with_extra("latency_ms", serde_json::json!(20));
        let backend = MockBackend::from_config(config).unwrap();
        assert_eq!(backend.name(), "mock");
        assert_eq!(backend.capabilities().num_qubits, 27);
        assert_eq!(backend.latency, Duration::from_millis(20));
        assert_eq!(
            backend.response,
            MockResponse::Fixed(EstimatorResult::new(0.1, 0.02))
        );

        let half = BackendConfig::new("mock").with_extra("evs", serde_json::json!(0.1));
        assert!(matches!(MockBackend::from_config(half), Err(HalError::Configuration(_))));

        let unknown = BackendConfig::new("mock").with_extra("device", serde_json::json!("nowhere"));
        assert!(matches!(MockBackend::from_config(unknown), Err(HalError::UnknownBackend(_))));
    }
}
