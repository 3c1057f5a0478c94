//! Resilient request execution.
//!
//! Wraps a transport with the retry policy: transient failures sleep out
//! the computed delay and try again, fatal failures return immediately,
//! and an exhausted budget surfaces the last transient cause. Concurrent
//! requests are independent; the executor holds no shared mutable state.

use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;

use super::retry::{is_transient_status, RetryConfig, RetryDecision};
use crate::http::transport::{ServiceRequest, ServiceResponse, Transport, TransportError};

/// Terminal failure of a request, after any retries.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Network-level failure.
    #[error(transparent)]
    Network(#[from] TransportError),
    /// Non-success response from the service.
    #[error("service returned status {status}")]
    Status { status: u16, body: String },
    /// Retry budget exceeded; wraps the last transient failure.
    #[error("request failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<RequestError>,
    },
}

/// Executes service requests through a transport, retrying transient
/// failures per the configured policy.
///
/// A request suspends only while awaiting the transport and while waiting
/// out an inter-attempt delay. Dropping the returned future cancels the
/// in-flight call and any pending delay; no further attempt is made.
#[derive(Debug, Clone)]
pub struct RequestExecutor<T> {
    transport: T,
    retry: RetryConfig,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, retry: RetryConfig) -> Self {
        Self { transport, retry }
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Execute one request, retrying per policy, and surface the final
    /// outcome.
    pub async fn execute(
        &self,
        request: &ServiceRequest,
    ) -> Result<ServiceResponse, RequestError> {
        let mut attempt: u32 = 1;
        loop {
            let failure = match self.transport.send(request).await {
                Ok(response) if response.is_success() => {
                    debug!(
                        "{} {} succeeded with status {} on attempt {}",
                        request.method.as_str(),
                        request.path,
                        response.status,
                        attempt
                    );
                    return Ok(response);
                }
                Ok(response) if is_transient_status(response.status) => {
                    TransientFailure::Throttled(response)
                }
                Ok(response) => {
                    warn!(
                        "{} {} failed with status {}, not retryable",
                        request.method.as_str(),
                        request.path,
                        response.status
                    );
                    return Err(RequestError::Status {
                        status: response.status,
                        body: response.body,
                    });
                }
                Err(err) => TransientFailure::Network(err),
            };

            match self.retry.evaluate(attempt, failure.retry_after()) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        "attempt {} of {} {} failed ({}), retrying in {:?}",
                        attempt,
                        request.method.as_str(),
                        request.path,
                        failure.describe(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Stop => {
                    warn!(
                        "{} {} failed ({}) and exhausted {} attempts, giving up",
                        request.method.as_str(),
                        request.path,
                        failure.describe(),
                        attempt
                    );
                    return Err(RequestError::Exhausted {
                        attempts: attempt,
                        last: Box::new(failure.into_error()),
                    });
                }
            }
        }
    }
}

/// A failure the policy may retry.
enum TransientFailure {
    Throttled(ServiceResponse),
    Network(TransportError),
}

impl TransientFailure {
    fn retry_after(&self) -> Option<Duration> {
        match self {
            TransientFailure::Throttled(response) => response.retry_after(),
            TransientFailure::Network(_) => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            TransientFailure::Throttled(response) => format!("status {}", response.status),
            TransientFailure::Network(err) => err.to_string(),
        }
    }

    fn into_error(self) -> RequestError {
        match self {
            TransientFailure::Throttled(response) => RequestError::Status {
                status: response.status,
                body: response.body,
            },
            TransientFailure::Network(err) => RequestError::Network(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Transport that replays a scripted sequence of outcomes and records
    /// when each attempt arrived.
    struct ScriptedTransport {
        script: Mutex<Vec<Result<ServiceResponse, TransportError>>>,
        attempt_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<ServiceResponse, TransportError>>) -> Self {
            Self {
                script: Mutex::new(script),
                attempt_times: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> usize {
            self.attempt_times.lock().unwrap().len()
        }

        fn delays(&self) -> Vec<Duration> {
            let times = self.attempt_times.lock().unwrap();
            times.windows(2).map(|pair| pair[1] - pair[0]).collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            _request: &ServiceRequest,
        ) -> Result<ServiceResponse, TransportError> {
            self.attempt_times.lock().unwrap().push(Instant::now());
            let mut script = self.script.lock().unwrap();
            assert!(!script.is_empty(), "transport script exhausted");
            script.remove(0)
        }
    }

    fn response(status: u16) -> ServiceResponse {
        ServiceResponse {
            status,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    fn response_with_retry_after(status: u16, seconds: u64) -> ServiceResponse {
        let mut headers = HashMap::new();
        headers.insert("Retry-After".to_string(), seconds.to_string());
        ServiceResponse {
            status,
            headers,
            body: String::new(),
        }
    }

    fn config(max_retries: u32, delay_secs: u64, incremental: bool) -> RetryConfig {
        RetryConfig {
            use_retry_after_header: false,
            max_retries,
            base_delay: Duration::from_secs(delay_secs),
            incremental_delay: incremental,
        }
    }

    fn request() -> ServiceRequest {
        ServiceRequest::get("sites('hr')/lists")
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_kth_attempt_makes_exactly_k_attempts() {
        let transport = ScriptedTransport::new(vec![
            Ok(response(503)),
            Ok(response(503)),
            Ok(response(200)),
        ]);
        let executor = RequestExecutor::new(transport, config(5, 1, false));

        let result = executor.execute(&request()).await.unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(executor.transport.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_transient_failure_exhausts_budget() {
        let transport = ScriptedTransport::new(vec![
            Ok(response(429)),
            Ok(response(429)),
            Ok(response(429)),
            Ok(response(429)),
        ]);
        let executor = RequestExecutor::new(transport, config(3, 1, false));

        let err = executor.execute(&request()).await.unwrap_err();
        // maxRetries + 1 attempts total.
        assert_eq!(executor.transport.attempts(), 4);
        match err {
            RequestError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 4);
                assert!(matches!(*last, RequestError::Status { status: 429, .. }));
            }
            other => panic!("expected exhausted, got {}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_status_returns_after_one_attempt() {
        let transport = ScriptedTransport::new(vec![Ok(response(400))]);
        let executor = RequestExecutor::new(transport, config(3, 1, true));

        let err = executor.execute(&request()).await.unwrap_err();
        assert_eq!(executor.transport.attempts(), 1);
        assert!(matches!(err, RequestError::Status { status: 400, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failures_are_retried() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::new("connection reset")),
            Ok(response(200)),
        ]);
        let executor = RequestExecutor::new(transport, config(3, 1, false));

        let result = executor.execute(&request()).await.unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(executor.transport.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_network_failure_carries_last_cause() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::new("connection reset")),
            Err(TransportError::new("connection reset")),
        ]);
        let executor = RequestExecutor::new(transport, config(1, 1, false));

        let err = executor.execute(&request()).await.unwrap_err();
        match err {
            RequestError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, RequestError::Network(_)));
            }
            other => panic!("expected exhausted, got {}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_incremental_delays_grow_linearly() {
        // Backoff is linear, not exponential: base 1s gives 1s, 2s, 3s
        // before attempts 2, 3, 4.
        let transport = ScriptedTransport::new(vec![
            Ok(response(503)),
            Ok(response(503)),
            Ok(response(503)),
            Ok(response(200)),
        ]);
        let executor = RequestExecutor::new(transport, config(3, 1, true));

        executor.execute(&request()).await.unwrap();
        assert_eq!(
            executor.transport.delays(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_constant_delay_when_not_incremental() {
        let transport = ScriptedTransport::new(vec![
            Ok(response(503)),
            Ok(response(503)),
            Ok(response(200)),
        ]);
        let executor = RequestExecutor::new(transport, config(3, 2, false));

        executor.execute(&request()).await.unwrap();
        assert_eq!(
            executor.transport.delays(),
            vec![Duration::from_secs(2), Duration::from_secs(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_overrides_computed_delay() {
        let transport = ScriptedTransport::new(vec![
            Ok(response_with_retry_after(429, 7)),
            Ok(response(200)),
        ]);
        let mut retry = config(3, 1, true);
        retry.use_retry_after_header = true;
        let executor = RequestExecutor::new(transport, retry);

        executor.execute(&request()).await.unwrap();
        assert_eq!(executor.transport.delays(), vec![Duration::from_secs(7)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_ignored_when_disabled() {
        let transport = ScriptedTransport::new(vec![
            Ok(response_with_retry_after(429, 7)),
            Ok(response(200)),
        ]);
        let executor = RequestExecutor::new(transport, config(3, 1, true));

        executor.execute(&request()).await.unwrap();
        assert_eq!(executor.transport.delays(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_are_independent() {
        use std::sync::Arc;

        struct FlakyOnce {
            first: Mutex<bool>,
        }

        #[async_trait]
        impl Transport for FlakyOnce {
            async fn send(
                &self,
                _request: &ServiceRequest,
            ) -> Result<ServiceResponse, TransportError> {
                let mut first = self.first.lock().unwrap();
                if *first {
                    *first = false;
                    return Ok(response(503));
                }
                Ok(response(200))
            }
        }

        let executor = Arc::new(RequestExecutor::new(
            FlakyOnce {
                first: Mutex::new(true),
            },
            config(3, 1, false),
        ));

        let a = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(&request()).await }
        });
        let b = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(&request()).await }
        });

        assert_eq!(a.await.unwrap().unwrap().status, 200);
        assert_eq!(b.await.unwrap().unwrap().status, 200);
    }
}
