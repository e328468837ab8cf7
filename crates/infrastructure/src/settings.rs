//! Settings loading.
//!
//! Settings are layered: built-in defaults, then an optional TOML file in
//! the platform config directory, then environment variables:
//! - Linux: ~/.config/relaydesk/relaydesk.toml
//! - macOS: ~/Library/Application Support/relaydesk/relaydesk.toml
//! - Windows: %APPDATA%/relaydesk/relaydesk.toml

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use relaydesk_domain::ClientSettings;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Prefix of the client's environment variables.
pub const CLIENT_ENV_PREFIX: &str = "RELAYDESK";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or a value has the wrong type.
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

/// Returns the path of the settings file, if a config directory exists.
#[must_use]
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("relaydesk").join("relaydesk.toml"))
}

/// Loads the client settings from the settings file and `RELAYDESK_*`
/// environment variables.
///
/// # Errors
///
/// Returns an error if the file is malformed or a value has the wrong type.
pub fn load_client_settings() -> Result<ClientSettings, SettingsError> {
    load_settings(CLIENT_ENV_PREFIX, settings_path().as_deref(), None)
}

/// Loads settings of type `T` from an optional file and the environment
/// variables starting with `prefix_`.
///
/// A missing file is not an error. When `env` is given it replaces the
/// process environment.
///
/// # Errors
///
/// Returns an error if the file is malformed or a value has the wrong type.
pub fn load_settings<T: DeserializeOwned>(
    prefix: &str,
    file: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<T, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = file {
        debug!(path = %path.display(), "reading settings file");
        builder = builder.add_source(File::from(path).required(false));
    }
    builder = builder.add_source(
        Environment::with_prefix(prefix)
            .prefix_separator("_")
            .try_parsing(true)
            .source(env),
    );

    Ok(builder.build()?.try_deserialize()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    fn env(vars: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn settings_path_is_valid() {
        if let Some(path) = settings_path() {
            assert!(path.ends_with("relaydesk/relaydesk.toml"));
        }
    }

    #[test]
    fn defaults_apply_without_sources() {
        let settings: ClientSettings = load_settings(CLIENT_ENV_PREFIX, None, env(&[])).unwrap();
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaydesk.toml");
        std::fs::write(
            &path,
            "shell_api_url = \"https://relay.example.com/api\"\ndefault_timeout_ms = 5000\n",
        )
        .unwrap();

        let settings: ClientSettings = load_settings(
            CLIENT_ENV_PREFIX,
            Some(&path),
            env(&[("RELAYDESK_DEFAULT_TIMEOUT_MS", "2500")]),
        )
        .unwrap();

        assert_eq!(settings.shell_api_url, "https://relay.example.com/api");
        assert_eq!(settings.default_timeout(), Duration::from_millis(2500));
        assert_eq!(settings.api_base_url, "/api");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings: ClientSettings = load_settings(
            CLIENT_ENV_PREFIX,
            Some(&dir.path().join("absent.toml")),
            env(&[]),
        )
        .unwrap();
        assert_eq!(settings.chat_timeout_ms, 30_000);
    }

    #[test]
    fn wrong_type_is_reported() {
        let result: Result<ClientSettings, _> = load_settings(
            CLIENT_ENV_PREFIX,
            None,
            env(&[("RELAYDESK_CHAT_TIMEOUT_MS", "soon")]),
        );
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }
}
