//! Process-wide client settings.
//!
//! Settings are applied once when a client is constructed. Retry options
//! are grouped per logical request category so throttling-sensitive
//! endpoints can carry their own budget.

use std::time::Duration;

use crate::constants;

/// Retry options of one request category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOptions {
    /// Honor a server-supplied Retry-After hint instead of the computed
    /// delay.
    pub use_retry_after_header: bool,
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay between attempts, in seconds.
    pub delay_seconds: u64,
    /// Grow the delay linearly with the attempt number.
    pub incremental_delay: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            use_retry_after_header: true,
            max_retries: 10,
            delay_seconds: 3,
            incremental_delay: true,
        }
    }
}

/// Global settings applied when constructing a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    /// User-Agent header sent with every request.
    pub http_user_agent: String,
    /// Overall per-request timeout of the underlying HTTP client.
    pub http_timeout: Duration,
    /// Retry options of the content REST endpoint (sites, lists, items).
    pub rest_retry: RetryOptions,
    /// Retry options of the directory endpoint (users).
    pub directory_retry: RetryOptions,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            http_user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(constants::DEFAULT_HTTP_TIMEOUT_SECS),
            rest_retry: RetryOptions::default(),
            directory_retry: RetryOptions::default(),
        }
    }
}

impl GlobalSettings {
    /// Create a new builder for GlobalSettings.
    pub fn builder() -> GlobalSettingsBuilder {
        GlobalSettingsBuilder::new()
    }
}

/// Builder for [`GlobalSettings`].
#[derive(Debug, Default)]
pub struct GlobalSettingsBuilder {
    settings: GlobalSettings,
}

impl GlobalSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: GlobalSettings::default(),
        }
    }

    /// Set the User-Agent header.
    pub fn http_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.settings.http_user_agent = agent.into();
        self
    }

    /// Set the per-request timeout.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.settings.http_timeout = timeout;
        self
    }

    /// Configure retries for the content REST endpoint.
    pub fn rest_retry(mut self, options: RetryOptions) -> Self {
        self.settings.rest_retry = options;
        self
    }

    /// Configure retries for the directory endpoint.
    pub fn directory_retry(mut self, options: RetryOptions) -> Self {
        self.settings.directory_retry = options;
        self
    }

    /// Set the REST endpoint's maximum retry count.
    pub fn rest_max_retries(mut self, max_retries: u32) -> Self {
        self.settings.rest_retry.max_retries = max_retries;
        self
    }

    /// Build the final settings.
    pub fn build(self) -> GlobalSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GlobalSettings::default();

        assert_eq!(settings.http_user_agent, constants::DEFAULT_USER_AGENT);
        assert_eq!(settings.http_timeout, Duration::from_secs(100));
        assert!(settings.rest_retry.use_retry_after_header);
        assert_eq!(settings.rest_retry.max_retries, 10);
        assert_eq!(settings.rest_retry.delay_seconds, 3);
        assert!(settings.rest_retry.incremental_delay);
        assert_eq!(settings.directory_retry, RetryOptions::default());
    }

    #[test]
    fn test_builder_pattern() {
        let settings = GlobalSettings::builder()
            .http_user_agent("contoso-sync")
            .http_timeout(Duration::from_secs(30))
            .rest_max_retries(2)
            .directory_retry(RetryOptions {
                use_retry_after_header: false,
                max_retries: 1,
                delay_seconds: 5,
                incremental_delay: false,
            })
            .build();

        assert_eq!(settings.http_user_agent, "contoso-sync");
        assert_eq!(settings.http_timeout, Duration::from_secs(30));
        assert_eq!(settings.rest_retry.max_retries, 2);
        assert_eq!(settings.directory_retry.max_retries, 1);
        assert!(!settings.directory_retry.use_retry_after_header);
    }
}
