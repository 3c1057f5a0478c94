//! Resilience features for service requests.
//!
//! Provides the retry policy and the retrying request executor that sits
//! beneath every data-model operation.

pub mod executor;
pub mod retry;

pub use executor::{RequestError, RequestExecutor};
pub use retry::{is_transient_status, RetryConfig, RetryDecision};
