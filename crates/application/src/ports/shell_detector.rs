//! Desktop shell detection port

use async_trait::async_trait;
use relaydesk_domain::ShellGlobals;
use thiserror::Error;

/// Errors raised by the shell's own APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellApiError {
    /// The API is not exposed in this context.
    #[error("shell API unavailable: {0}")]
    Unavailable(String),

    /// The API exists but the call failed.
    #[error("shell API call failed: {0}")]
    CallFailed(String),

    /// The injected globals could not be read.
    #[error("malformed shell globals: {0}")]
    Malformed(String),
}

/// Capability that reads the globals the desktop shell injects at startup
/// and calls into the shell's informational APIs.
#[async_trait]
pub trait ShellDetector: Send + Sync {
    /// Reads the injected globals.
    ///
    /// Returns `Ok(None)` when there is no execution context at all, for
    /// instance in a headless server process. Must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the globals exist but cannot be read.
    fn globals(&self) -> Result<Option<ShellGlobals>, ShellApiError>;

    /// Asks the shell for the application version.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell API is missing or fails.
    async fn app_version(&self) -> Result<String, ShellApiError>;

    /// Asks the shell for its platform label.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell API is missing or fails.
    async fn platform(&self) -> Result<String, ShellApiError>;
}
