//! Service endpoint and header constants.

/// Path prefix of the content REST endpoint (sites, lists, items).
pub const REST_API_PREFIX: &str = "_api/v1";

/// Path prefix of the directory endpoint (users).
pub const DIRECTORY_API_PREFIX: &str = "_directory/v1";

/// Accept header sent with every request.
pub const ACCEPT_JSON: &str = "application/json;odata.metadata=minimal;odata.streaming=true";

/// Header carrying the server-supplied retry hint.
pub const HEADER_RETRY_AFTER: &str = "Retry-After";

/// User agent reported when the caller does not configure one.
pub const DEFAULT_USER_AGENT: &str = "sitehub-client-rust";

/// Per-request timeout applied when the caller does not configure one.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 100;
