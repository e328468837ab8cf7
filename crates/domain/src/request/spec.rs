//! Transport request type

use std::time::Duration;

use serde::Serialize;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Returns `endpoint` with exactly one guaranteed leading slash.
///
/// `"ping"` and `"/ping"` both become `"/ping"`, so the resolved URL does
/// not depend on how the caller spelled the endpoint.
///
/// # Errors
///
/// Returns [`DomainError::EmptyEndpoint`] when the endpoint is empty or
/// whitespace, which would otherwise address the service root.
pub fn normalize_endpoint(endpoint: &str) -> DomainResult<String> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyEndpoint);
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

/// A request addressed to an API endpoint rather than a full URL.
///
/// The transport selector decides which base URL the endpoint is joined
/// to, depending on whether the process runs inside the desktop shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportRequest {
    /// Endpoint path below the API base, e.g. `/chat`
    pub endpoint: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: Headers,
    /// Optional request payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Per-call deadline; the selector's default applies when absent
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Creates a request for `endpoint` with the given method.
    #[must_use]
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            headers: Headers::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    /// Creates an OPTIONS request.
    #[must_use]
    pub fn options(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Options, endpoint)
    }

    /// Creates a POST request carrying a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `payload` cannot be serialized.
    pub fn post_json<T: Serialize>(
        endpoint: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(payload)?;
        Ok(Self::new(HttpMethod::Post, endpoint)
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request payload.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Overrides the default deadline for this call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the normalized endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty.
    pub fn normalized_endpoint(&self) -> DomainResult<String> {
        normalize_endpoint(&self.endpoint)
    }
}
