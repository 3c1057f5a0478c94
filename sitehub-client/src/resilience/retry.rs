//! Retry policy for transient request failures.
//!
//! Transient failures (throttling, temporary unavailability, network
//! errors) are retried up to a configured budget; everything else is
//! surfaced immediately. The policy is a plain parameter struct plus a
//! pure per-attempt decision function, so a call site can be configured
//! per logical request category and the decision is trivially testable.

use std::time::Duration;

use crate::settings::RetryOptions;

/// Retry behavior for one request category. Immutable once an executor
/// is constructed; read on each retry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Honor a server-supplied Retry-After hint instead of the computed
    /// delay.
    pub use_retry_after_header: bool,
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay between attempts.
    pub base_delay: Duration,
    /// Grow the delay linearly with the attempt number instead of keeping
    /// it constant.
    pub incremental_delay: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from_options(&RetryOptions::default())
    }
}

impl RetryConfig {
    /// Build a config from the settings-level options of a request
    /// category.
    pub fn from_options(options: &RetryOptions) -> Self {
        Self {
            use_retry_after_header: options.use_retry_after_header,
            max_retries: options.max_retries,
            base_delay: Duration::from_secs(options.delay_seconds),
            incremental_delay: options.incremental_delay,
        }
    }

    /// Decide what to do after a failed attempt.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed;
    /// `retry_after` is the server-supplied hint, if the response carried
    /// one. The delay is the hint when configured and present, otherwise
    /// `base_delay * attempt` in incremental mode and `base_delay` flat
    /// otherwise. The growth is linear, never exponential.
    pub fn evaluate(&self, attempt: u32, retry_after: Option<Duration>) -> RetryDecision {
        if attempt > self.max_retries {
            return RetryDecision::Stop;
        }
        if self.use_retry_after_header {
            if let Some(hint) = retry_after {
                return RetryDecision::Retry(hint);
            }
        }
        let factor = if self.incremental_delay { attempt } else { 1 };
        RetryDecision::Retry(self.base_delay * factor)
    }
}

/// Outcome of one retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait out the delay, then attempt again.
    Retry(Duration),
    /// Budget exhausted; surface the failure.
    Stop,
}

/// Whether a response status indicates a transient condition worth
/// retrying: throttling or temporary service unavailability.
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 503 | 504)
}
