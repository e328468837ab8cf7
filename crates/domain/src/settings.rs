//! Client Settings Domain Model
//!
//! Where the client sends its requests and how long it waits for them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// API base used outside the shell. Relative paths are same-origin
    /// requests resolved against `page_origin`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Absolute API base used inside the shell, whose network layer
    /// cannot resolve relative paths.
    #[serde(default = "default_shell_api_url")]
    pub shell_api_url: String,

    /// Origin the front end is served from.
    #[serde(default = "default_page_origin")]
    pub page_origin: String,

    /// Origin the shell announces on its requests.
    #[serde(default = "default_shell_origin")]
    pub shell_origin: String,

    /// Deadline applied to every request without its own timeout.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Deadline for chat and image relay calls.
    #[serde(default = "default_chat_timeout_ms")]
    pub chat_timeout_ms: u64,
}

fn default_api_base_url() -> String {
    "/api".to_string()
}

fn default_shell_api_url() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_page_origin() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_shell_origin() -> String {
    "tauri://localhost".to_string()
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_chat_timeout_ms() -> u64 {
    30_000
}

impl ClientSettings {
    /// Returns the default request deadline.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Returns the deadline for relay calls.
    #[must_use]
    pub const fn chat_timeout(&self) -> Duration {
        Duration::from_millis(self.chat_timeout_ms)
    }

    /// Returns the base URL for the given context, without a trailing slash.
    #[must_use]
    pub fn base_url(&self, in_shell: bool) -> &str {
        let base = if in_shell {
            &self.shell_api_url
        } else {
            &self.api_base_url
        };
        base.trim_end_matches('/')
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            shell_api_url: default_shell_api_url(),
            page_origin: default_page_origin(),
            shell_origin: default_shell_origin(),
            default_timeout_ms: default_timeout_ms(),
            chat_timeout_ms: default_chat_timeout_ms(),
        }
    }
}
