//! Polling behaviour of the provided `Backend::wait`.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use mitex_hal::{
    Backend, BackendAvailability, Capabilities, EstimatorOptions, EstimatorPub, EstimatorResult,
    HalError, HalResult, JobId, JobStatus, MAX_POLLS, ValidationResult, validate_request,
};

/// Reports `Running` for a fixed number of polls, then `terminal`.
struct SlowBackend {
    capabilities: Capabilities,
    running_polls: u32,
    terminal: JobStatus,
    polls: AtomicU32,
    cancelled: Mutex<Vec<JobId>>,
}

impl SlowBackend {
    fn new(running_polls: u32, terminal: JobStatus) -> Self {
        Self {
            capabilities: Capabilities::simulator("slow", 2),
            running_polls,
            terminal,
            polls: AtomicU32::new(0),
            cancelled: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Backend for SlowBackend {
    fn name(&self) -> &str {
        "slow"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, request: &EstimatorPub) -> HalResult<ValidationResult> {
        Ok(validate_request(&self.capabilities, request))
    }

    async fn submit(&self, _: &EstimatorPub, _: &EstimatorOptions) -> HalResult<JobId> {
        Ok(JobId::new("job-0"))
    }

    async fn status(&self, _: &JobId) -> HalResult<JobStatus> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        if n < self.running_polls {
            Ok(JobStatus::Running)
        } else {
            Ok(self.terminal.clone())
        }
    }

    async fn result(&self, _: &JobId) -> HalResult<EstimatorResult> {
        Ok(EstimatorResult::new(0.25, 0.01))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.cancelled.lock().unwrap().push(job_id.clone());
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn wait_returns_result_once_completed() {
    let backend = SlowBackend::new(3, JobStatus::Completed);
    let result = backend.wait(&JobId::new("job-0")).await.unwrap();
    assert_eq!(result, EstimatorResult::new(0.25, 0.01));
    assert_eq!(backend.polls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn wait_surfaces_failure() {
    let backend = SlowBackend::new(1, JobStatus::Failed("calibration drift".into()));
    let err = backend.wait(&JobId::new("job-0")).await.unwrap_err();
    assert!(matches!(err, HalError::JobFailed(msg) if msg == "calibration drift"));
}

#[tokio::test(start_paused = true)]
async fn wait_reports_interruption_as_transient() {
    let backend = SlowBackend::new(2, JobStatus::Interrupted("preempted".into()));
    let err = backend.wait(&JobId::new("job-0")).await.unwrap_err();
    assert!(matches!(err, HalError::TransientFailure(ref msg) if msg == "preempted"));
    assert!(err.is_transient());
}

#[tokio::test(start_paused = true)]
async fn wait_surfaces_cancellation() {
    let backend = SlowBackend::new(0, JobStatus::Cancelled);
    let err = backend.wait(&JobId::new("job-0")).await.unwrap_err();
    assert!(matches!(err, HalError::JobCancelled));
    assert!(backend.cancelled.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn wait_gives_up_after_max_polls() {
    let backend = SlowBackend::new(u32::MAX, JobStatus::Completed);
    let err = backend.wait(&JobId::new("job-0")).await.unwrap_err();
    assert!(matches!(err, HalError::Timeout(id) if id == "job-0"));
    assert_eq!(backend.polls.load(Ordering::SeqCst), MAX_POLLS);
}
