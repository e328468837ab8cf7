//! Errors surfaced by the transport layer to its callers.
//!
//! Every failure in the dispatcher ends up as an [`ApiError`]: validation
//! problems caught before sending, transport failures where no response
//! arrived, upstream non-2xx responses and unreadable payloads. A status
//! of `0` never denotes a real HTTP status; it marks the first two.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories of API errors for display and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Malformed input rejected before any network call.
    Validation,
    /// No response was received (DNS, connection, shell API failure).
    Network,
    /// The deadline elapsed before a response arrived.
    Timeout,
    /// The server answered with a non-2xx status.
    Http,
    /// The response body could not be read or parsed.
    Parse,
}

impl ApiErrorKind {
    /// Returns a human-readable title for this error type.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Validation => "Invalid Request",
            Self::Network => "Network Error",
            Self::Timeout => "Request Timeout",
            Self::Http => "Request Failed",
            Self::Parse => "Unreadable Response",
        }
    }

    /// Returns user-facing suggestions for this error type.
    #[must_use]
    pub const fn suggestions(self) -> &'static [&'static str] {
        match self {
            Self::Validation => &["Check the endpoint passed to the client"],
            Self::Network => &[
                "Check your internet connection",
                "Verify the API URL in the settings",
                "Check that the relay server is running",
            ],
            Self::Timeout => &[
                "The server may be slow or overloaded",
                "Try again in a moment",
            ],
            Self::Http => &["Check the error details returned by the server"],
            Self::Parse => &["The server returned something other than JSON"],
        }
    }
}

/// An error produced while sending a request or reading its response.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// Short description of what failed
    pub message: String,
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    /// The resolved URL the request was sent to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Raw response body or underlying failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a validation error. No request was sent.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Validation,
            message: message.into(),
            status: 0,
            url: None,
            details: None,
        }
    }

    /// Creates a transport-level error for a request that got no response.
    #[must_use]
    pub fn network(url: impl Into<String>, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        Self {
            kind: ApiErrorKind::Network,
            message: cause.clone(),
            status: 0,
            url: Some(url.into()),
            details: Some(cause),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(url: impl Into<String>, after: Duration) -> Self {
        Self {
            kind: ApiErrorKind::Timeout,
            message: format!("Request timed out after {} ms", after.as_millis()),
            status: 0,
            url: Some(url.into()),
            details: Some(format!("deadline of {} ms elapsed", after.as_millis())),
        }
    }

    /// Creates an error for a non-2xx response.
    ///
    /// `body` is the response text when it could be read; it is left out
    /// otherwise rather than failing the whole call.
    #[must_use]
    pub fn http(status: u16, url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("Request failed with status {status}"),
            status,
            url: Some(url.into()),
            details: body,
        }
    }

    /// Creates an error for a body that could not be read or parsed.
    #[must_use]
    pub fn parse(status: u16, url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: "Failed to parse response as JSON".to_string(),
            status,
            url: Some(url.into()),
            details: Some(cause.into()),
        }
    }

    /// Returns true if no HTTP response was received.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        self.status == 0
    }

    /// Returns true for 401 and 403 responses.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Renders a sentence suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        let url = self.url.as_deref().unwrap_or("the API");
        match (self.kind, self.status) {
            (ApiErrorKind::Validation, _) => self.message.clone(),
            (ApiErrorKind::Timeout, _) => format!("Timed out while contacting {url}"),
            (ApiErrorKind::Network, _) => format!(
                "Network error: could not connect to {url}. Check your internet connection and the API URL."
            ),
            (_, 401) => format!(
                "Authentication required: the API at {url} needs valid credentials (401 Unauthorized)"
            ),
            (_, 403) => format!(
                "Access denied: insufficient rights for the API at {url} (403 Forbidden)"
            ),
            (_, 404) => format!("The API is not reachable at {url} (404 Not Found)"),
            (_, status) if status >= 500 => format!("Server error while accessing {url} ({status})"),
            _ => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn network_errors_carry_status_zero_and_cause() {
        let error = ApiError::network("http://127.0.0.1:9/api/ping", "connection refused");

        assert_eq!(error.status, 0);
        assert_eq!(error.kind, ApiErrorKind::Network);
        assert!(error.is_transport_failure());
        assert_eq!(error.details.as_deref(), Some("connection refused"));
    }

    #[test]
    fn http_errors_keep_status_and_body() {
        let error = ApiError::http(404, "/api/missing", Some("not here".to_string()));

        assert_eq!(error.status, 404);
        assert_eq!(error.to_string(), "Request failed with status 404");
        assert_eq!(error.details.as_deref(), Some("not here"));
        assert!(!error.is_transport_failure());
    }

    #[test]
    fn validation_errors_have_no_url() {
        let error = ApiError::validation("endpoint must not be empty");
        assert_eq!(error.status, 0);
        assert!(error.url.is_none());
        assert_eq!(error.user_message(), "endpoint must not be empty");
    }

    #[test]
    fn user_message_explains_auth_failures() {
        assert!(ApiError::http(401, "/api/chat", None).is_auth_error());
        assert!(
            ApiError::http(403, "/api/chat", None)
                .user_message()
                .contains("403 Forbidden")
        );
        assert!(
            ApiError::http(503, "/api/chat", None)
                .user_message()
                .starts_with("Server error")
        );
    }

    #[test]
    fn serializes_without_empty_fields() {
        let json = serde_json::to_value(ApiError::validation("bad")).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({"kind": "validation", "message": "bad", "status": 0})
        );
    }

    #[test]
    fn every_kind_has_suggestions() {
        for kind in [
            ApiErrorKind::Validation,
            ApiErrorKind::Network,
            ApiErrorKind::Timeout,
            ApiErrorKind::Http,
            ApiErrorKind::Parse,
        ] {
            assert!(!kind.suggestions().is_empty(), "{}", kind.title());
        }
    }
}
