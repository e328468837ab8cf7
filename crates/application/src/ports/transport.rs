//! Transport port
//!
//! A transport is the mechanism that actually puts a request on the
//! wire. There are two: the native HTTP stack and the one provided by the
//! desktop shell. Both answer with a [`RawResponse`] whose body has not
//! been read yet.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relaydesk_domain::{Headers, HttpMethod};
use thiserror::Error;

/// Which transport served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// The process's own HTTP stack.
    Native,
    /// The HTTP layer provided by the desktop shell.
    Shell,
}

impl TransportKind {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Shell => "shell",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures that happen before a response is received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The URL could not be used by this transport.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// DNS resolution or connection establishment failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The transport's own deadline elapsed.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that elapsed
        timeout_ms: u64,
    },

    /// The shell's request API raised an error.
    #[error("shell transport error: {0}")]
    Shell(String),

    /// The transport could not be loaded.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// Reading the response body failed.
    #[error("failed to read body: {0}")]
    Body(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// A request whose URL has already been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// Destination, absolute or origin-relative
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: Headers,
    /// Request payload
    pub body: Option<String>,
    /// Deadline for this call
    pub timeout: Duration,
}

/// A response body that can be consumed exactly once.
#[async_trait]
pub trait BodyReader: Send {
    /// Reads the whole body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be read.
    async fn read_text(self: Box<Self>) -> Result<String, TransportError>;
}

/// A body that is already in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBody(pub String);

impl TextBody {
    /// Creates a boxed body from text.
    #[must_use]
    pub fn boxed(text: impl Into<String>) -> Box<dyn BodyReader> {
        Box::new(Self(text.into()))
    }
}

#[async_trait]
impl BodyReader for TextBody {
    async fn read_text(self: Box<Self>) -> Result<String, TransportError> {
        Ok(self.0)
    }
}

/// What a transport returns once the status line and headers arrived.
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Unread body
    pub body: Box<dyn BodyReader>,
}

impl RawResponse {
    /// Creates a response with an in-memory body.
    #[must_use]
    pub fn text(status: u16, headers: Headers, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: TextBody::boxed(body),
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Port for sending HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identifies this transport.
    fn kind(&self) -> TransportKind;

    /// Sends the request and returns as soon as the headers are in.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError>;
}

/// Port for obtaining the shell transport, which may fail to load.
#[async_trait]
pub trait ShellTransportLoader: Send + Sync {
    /// Loads the shell's request function.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell transport is not available.
    async fn load(&self) -> Result<Arc<dyn Transport>, TransportError>;
}
