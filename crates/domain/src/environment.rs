//! Runtime environment description.
//!
//! The desktop shell injects a handful of globals into the process it
//! hosts. [`ShellGlobals`] is the read-only view of those globals and
//! [`EnvironmentInfo`] is what a full probe reports back to the UI.

use serde::{Deserialize, Serialize};

/// Platform label used outside the shell.
pub const PLATFORM_BROWSER: &str = "browser";
/// Platform label reported by the shell when its own API gives nothing better.
pub const PLATFORM_SHELL: &str = "shell";
/// Platform label when there is no execution context at all.
pub const PLATFORM_SERVER: &str = "server";
/// Platform label when probing failed.
pub const PLATFORM_UNKNOWN: &str = "unknown";

/// A window label exposed by the shell metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellWindow {
    /// The window label, e.g. `main`
    pub label: String,
}

/// Metadata object the shell publishes at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellMetadata {
    /// Platform label reported by the shell
    #[serde(default)]
    pub platform: Option<String>,
    /// Names of the plugins registered with the shell
    #[serde(default)]
    pub plugins: Vec<String>,
    /// The window hosting this process
    #[serde(default)]
    pub current_window: Option<ShellWindow>,
}

impl ShellMetadata {
    /// Returns true if a plugin with this name is registered.
    #[must_use]
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p == name)
    }
}

/// The shell-specific globals visible to this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellGlobals {
    /// Whether the internals marker is present; its mere presence means
    /// the process is hosted by the shell.
    pub internals: bool,
    /// The metadata object, when published.
    pub metadata: Option<ShellMetadata>,
}

impl ShellGlobals {
    /// Globals of a plain browser-like context.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            internals: false,
            metadata: None,
        }
    }

    /// Globals of a shell-hosted context.
    #[must_use]
    pub const fn shell(metadata: Option<ShellMetadata>) -> Self {
        Self {
            internals: true,
            metadata,
        }
    }

    /// Returns true if these globals identify the desktop shell.
    #[must_use]
    pub const fn indicates_shell(&self) -> bool {
        self.internals || self.metadata.is_some()
    }

    /// Returns the label of the hosting window, if any.
    #[must_use]
    pub fn window_label(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.current_window.as_ref())
            .map(|w| w.label.as_str())
    }
}

/// Result of a full environment probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    /// Whether the process runs inside the desktop shell
    pub is_shell: bool,
    /// Platform label, for display only
    pub platform: String,
    /// Shell application version, when the shell reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_version: Option<String>,
}

impl EnvironmentInfo {
    /// Environment of a process outside the shell.
    #[must_use]
    pub fn browser() -> Self {
        Self {
            is_shell: false,
            platform: PLATFORM_BROWSER.to_string(),
            shell_version: None,
        }
    }

    /// Environment reported when probing itself failed.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            is_shell: false,
            platform: PLATFORM_UNKNOWN.to_string(),
            shell_version: None,
        }
    }

    /// Short environment name for status lines.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        if self.is_shell { "shell" } else { "web" }
    }
}

/// Returns the operating system label the desktop host runs on.
#[must_use]
pub const fn host_os_label() -> &'static str {
    if cfg!(target_os = "macos") {
        "macOS"
    } else if cfg!(target_os = "ios") {
        "iOS"
    } else if cfg!(target_os = "android") {
        "Android"
    } else if cfg!(target_os = "windows") {
        "Windows"
    } else if cfg!(target_os = "linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn internals_marker_alone_indicates_shell() {
        assert!(ShellGlobals::shell(None).indicates_shell());
        assert!(!ShellGlobals::absent().indicates_shell());
    }

    #[test]
    fn metadata_alone_indicates_shell() {
        let globals = ShellGlobals {
            internals: false,
            metadata: Some(ShellMetadata::default()),
        };
        assert!(globals.indicates_shell());
    }

    #[test]
    fn metadata_parses_from_camel_case_json() {
        let metadata: ShellMetadata = serde_json::from_str(
            r#"{"platform":"linux","plugins":["http"],"currentWindow":{"label":"main"}}"#,
        )
        .unwrap_or_default();

        assert_eq!(metadata.platform.as_deref(), Some("linux"));
        assert!(metadata.has_plugin("http"));
        assert_eq!(
            ShellGlobals::shell(Some(metadata)).window_label(),
            Some("main")
        );
    }

    #[test]
    fn environment_info_serializes_for_the_ui() {
        let info = EnvironmentInfo {
            is_shell: true,
            platform: "shell (window: main)".to_string(),
            shell_version: Some("0.1.0".to_string()),
        };
        let json = serde_json::to_value(&info).unwrap_or_default();
        assert_eq!(json["isShell"], true);
        assert_eq!(json["shellVersion"], "0.1.0");
        assert_eq!(info.kind_label(), "shell");
    }

    #[test]
    fn host_os_label_is_known_on_test_hosts() {
        assert_ne!(host_os_label(), "");
    }
}
