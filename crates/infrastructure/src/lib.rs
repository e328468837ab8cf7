//! RelayDesk Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading.

pub mod adapters;
pub mod settings;

pub use adapters::{
    EnvShellDetector, HeadlessDetector, NativeTransport, OpenAiProvider, ProviderConfig,
    ReqwestShellTransportLoader, ShellTransport, SystemClock,
};
pub use settings::{SettingsError, load_client_settings, load_settings, settings_path};
