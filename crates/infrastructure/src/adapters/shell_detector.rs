//! Shell detection adapters.
//!
//! The desktop shell launches the process with a small set of
//! environment variables describing itself; [`EnvShellDetector`] reads
//! them. [`HeadlessDetector`] is for processes that have no execution
//! context to probe at all, such as the relay server.

use std::sync::Arc;

use async_trait::async_trait;
use relaydesk_application::ports::{ShellApiError, ShellDetector};
use relaydesk_domain::{ShellGlobals, ShellMetadata, host_os_label};

/// Presence of this variable marks a shell-hosted process.
pub const SHELL_INTERNALS_VAR: &str = "RELAYDESK_SHELL_INTERNALS";
/// JSON metadata published by the shell.
pub const SHELL_METADATA_VAR: &str = "RELAYDESK_SHELL_METADATA";
/// Application version reported by the shell.
pub const SHELL_VERSION_VAR: &str = "RELAYDESK_SHELL_VERSION";

type EnvSource = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads the shell globals from environment variables.
#[derive(Clone)]
pub struct EnvShellDetector {
    source: EnvSource,
}

impl EnvShellDetector {
    /// Creates a detector over the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(|name| std::env::var(name).ok())
    }

    /// Creates a detector over a custom variable lookup.
    #[must_use]
    pub fn with_source<F>(source: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
        }
    }

    fn metadata(&self) -> Result<Option<ShellMetadata>, ShellApiError> {
        (self.source)(SHELL_METADATA_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|e| ShellApiError::Malformed(format!("{SHELL_METADATA_VAR}: {e}")))
            })
            .transpose()
    }
}

impl Default for EnvShellDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShellDetector for EnvShellDetector {
    fn globals(&self) -> Result<Option<ShellGlobals>, ShellApiError> {
        Ok(Some(ShellGlobals {
            internals: (self.source)(SHELL_INTERNALS_VAR).is_some(),
            metadata: self.metadata()?,
        }))
    }

    async fn app_version(&self) -> Result<String, ShellApiError> {
        (self.source)(SHELL_VERSION_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ShellApiError::Unavailable(format!("{SHELL_VERSION_VAR} is not set")))
    }

    async fn platform(&self) -> Result<String, ShellApiError> {
        if let Some(platform) = self.metadata()?.and_then(|m| m.platform) {
            return Ok(platform);
        }
        match host_os_label() {
            "Unknown" => Err(ShellApiError::Unavailable(
                "platform could not be determined".to_string(),
            )),
            label => Ok(label.to_string()),
        }
    }
}

/// Detector for processes without any execution context.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessDetector;

#[async_trait]
impl ShellDetector for HeadlessDetector {
    fn globals(&self) -> Result<Option<ShellGlobals>, ShellApiError> {
        Ok(None)
    }

    async fn app_version(&self) -> Result<String, ShellApiError> {
        Err(ShellApiError::Unavailable("no execution context".to_string()))
    }

    async fn platform(&self) -> Result<String, ShellApiError> {
        Err(ShellApiError::Unavailable("no execution context".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use relaydesk_domain::ShellWindow;

    fn detector(vars: &[(&str, &str)]) -> EnvShellDetector {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvShellDetector::with_source(move |name| vars.get(name).cloned())
    }

    #[test]
    fn plain_process_is_not_shell() {
        let globals = detector(&[]).globals().unwrap().unwrap();
        assert_eq!(globals, ShellGlobals::absent());
        assert!(!globals.indicates_shell());
    }

    #[test]
    fn internals_marker_alone_indicates_shell() {
        let globals = detector(&[(SHELL_INTERNALS_VAR, "")]).globals().unwrap().unwrap();
        assert!(globals.internals);
        assert!(globals.indicates_shell());
    }

    #[test]
    fn metadata_is_parsed() {
        let globals = detector(&[(
            SHELL_METADATA_VAR,
            r#"{"platform":"macOS","plugins":["http"],"currentWindow":{"label":"main"}}"#,
        )])
        .globals()
        .unwrap()
        .unwrap();

        let metadata = globals.metadata.unwrap();
        assert_eq!(metadata.platform.as_deref(), Some("macOS"));
        assert!(metadata.has_plugin("http"));
        assert_eq!(
            metadata.current_window,
            Some(ShellWindow {
                label: "main".to_string()
            })
        );
    }

    #[test]
    fn malformed_metadata_is_an_error() {
        let error = detector(&[(SHELL_METADATA_VAR, "{not json")])
            .globals()
            .unwrap_err();
        assert!(matches!(error, ShellApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn version_comes_from_the_environment() {
        let with = detector(&[(SHELL_VERSION_VAR, " 2.0.1 ")]);
        let without = detector(&[]);

        assert_eq!(with.app_version().await.unwrap(), "2.0.1");
        assert!(without.app_version().await.is_err());
    }

    #[tokio::test]
    async fn platform_prefers_metadata() {
        let detector = detector(&[(SHELL_METADATA_VAR, r#"{"platform":"Windows"}"#)]);
        assert_eq!(detector.platform().await.unwrap(), "Windows");
    }

    #[tokio::test]
    async fn headless_has_no_context() {
        assert_eq!(HeadlessDetector.globals().unwrap(), None);
        assert!(HeadlessDetector.app_version().await.is_err());
    }
}
