//! Relay server settings.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use relaydesk_infrastructure::adapters::DEFAULT_BASE_URL;
use relaydesk_infrastructure::{SettingsError, load_settings};
use serde::Deserialize;

/// Prefix of the server's environment variables.
pub const SERVER_ENV_PREFIX: &str = "RELAYDESK_SERVER";

/// Variable holding the provider credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Server configuration, read from `RELAYDESK_SERVER_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Model used by the chat relay
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Model used by the image relay
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Base URL of the generation provider
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    /// Deadline of each provider call, in milliseconds
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,
    /// Deployment label echoed by `/api/test`
    #[serde(default = "default_node_env")]
    pub node_env: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_provider_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_provider_timeout_ms() -> u64 {
    60_000
}

fn default_node_env() -> String {
    "development".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            provider_base_url: default_provider_base_url(),
            provider_timeout_ms: default_provider_timeout_ms(),
            node_env: default_node_env(),
        }
    }
}

impl ServerSettings {
    /// Loads the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has the wrong type.
    pub fn from_env() -> Result<Self, SettingsError> {
        load_settings(SERVER_ENV_PREFIX, None, None)
    }

    /// Loads the settings from the given variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has the wrong type.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        load_settings(SERVER_ENV_PREFIX, None, Some(vars))
    }

    /// Returns the deadline of each provider call.
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns an error if host and port do not form an address.
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Reads the provider credential; blank values count as missing.
#[must_use]
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_VAR)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}
