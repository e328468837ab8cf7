//! Results of the connectivity diagnostics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api_error::ApiError;

/// CORS headers echoed by the server, reported verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsHeaders {
    /// `Access-Control-Allow-Origin`
    pub allow_origin: Option<String>,
    /// `Access-Control-Allow-Methods`
    pub allow_methods: Option<String>,
    /// `Access-Control-Allow-Headers`
    pub allow_headers: Option<String>,
}

impl CorsHeaders {
    /// Returns true if none of the headers were present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.allow_origin.is_none() && self.allow_methods.is_none() && self.allow_headers.is_none()
    }

    /// Fills missing values from `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            allow_origin: self.allow_origin.or(other.allow_origin),
            allow_methods: self.allow_methods.or(other.allow_methods),
            allow_headers: self.allow_headers.or(other.allow_headers),
        }
    }
}

/// Outcome of one diagnostic, ready for rendering.
///
/// Diagnostics never fail; a failure is a report with `success == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Whether the diagnostic passed
    pub success: bool,
    /// One-line summary
    pub message: String,
    /// Structured details for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// The error that made the diagnostic fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl DiagnosticReport {
    /// Creates a passing report.
    #[must_use]
    pub fn passed(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details,
            error: None,
        }
    }

    /// Creates a failing report from an error.
    ///
    /// The error's raw details are surfaced as the report details.
    #[must_use]
    pub fn failed(error: ApiError) -> Self {
        Self {
            success: false,
            message: error.message.clone(),
            details: error.details.clone().map(Value::String),
            error: Some(error),
        }
    }
}
