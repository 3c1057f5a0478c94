//! HTTP transport abstraction and the reqwest-backed implementation.
//!
//! A [`Transport`] issues exactly one HTTP-style request and reports the
//! status, headers, and body, or a network-level failure. Retrying is the
//! executor's responsibility; implementations must be safe for concurrent
//! use.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::constants;
use crate::settings::GlobalSettings;

/// HTTP method of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// One outbound request against the service.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub method: HttpMethod,
    /// Path relative to the transport's base address.
    pub path: String,
    /// Query parameters appended to the path; values are percent-encoded
    /// when the URL is assembled.
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl ServiceRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// Raw response surfaced to the hydration layer.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-supplied retry hint (delay-seconds form), if present.
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(constants::HEADER_RETRY_AFTER))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Network-level transport failure. Always classified as transient.
#[derive(Debug, Clone, Error)]
#[error("network error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Issues one HTTP-style request against the service.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ServiceRequest) -> Result<ServiceResponse, TransportError>;
}

/// reqwest-backed transport bound to one base address.
///
/// The base address, default headers, and timeout are configured once at
/// construction and never change afterwards.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url` with the service's default Accept
    /// header plus the settings-supplied user agent and timeout.
    pub fn new(
        base_url: impl Into<String>,
        settings: &GlobalSettings,
    ) -> Result<Self, TransportError> {
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(constants::ACCEPT_JSON));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.http_user_agent)
                .map_err(|err| TransportError::new(err.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.http_timeout)
            .build()?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    fn request_url(&self, request: &ServiceRequest) -> String {
        let mut url = format!("{}{}", self.base_url, request.path.trim_start_matches('/'));
        if !request.query.is_empty() {
            let query = request
                .query
                .iter()
                .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ServiceRequest) -> Result<ServiceResponse, TransportError> {
        let url = self.request_url(request);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Patch => self.client.patch(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(ServiceResponse {
            status,
            headers,
            body,
        })
    }
}
