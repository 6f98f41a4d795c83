//! mitex mock estimation backend
//!
//! A [`Backend`](mitex_hal::Backend) whose answers are scripted rather than
//! simulated. Every run with the same script yields the same results, which
//! makes it the backend of choice for tests and for dry runs of an
//! experiment configuration.
//!
//! # Scripting
//!
//! | Knob | Effect |
//! |------|--------|
//! | [`MockResponse`] | value returned when nothing more specific matches |
//! | `with_level_response` | fixed result for one resilience level |
//! | `fail_submission` | the n-th `submit` call fails, transiently or permanently |
//! | `with_latency` | jobs stay `Running` for this long |
//!
//! # Example
//!
//! ```ignore
//! use mitex_adapter_mock::MockBackend;
//! use mitex_hal::{Backend, EstimatorResult};
//!
//! let backend = MockBackend::new().with_default_result(EstimatorResult::new(0.0, 0.01));
//! let job = backend.submit(&request, &options).await?;
//! let result = backend.wait(&job).await?;
//! ```

mod mock;

pub use mock::{MockBackend, MockFailure, MockResponse};
