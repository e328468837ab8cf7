//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The endpoint is empty or only whitespace.
    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The chat role is not one of system, user or assistant.
    #[error("unknown chat role: {0}")]
    UnknownRole(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
