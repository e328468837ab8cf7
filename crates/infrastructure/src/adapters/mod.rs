//! Infrastructure adapters

mod openai_provider;
mod reqwest_transport;
mod shell_detector;
mod system_clock;

pub use openai_provider::{DEFAULT_BASE_URL, OpenAiProvider, ProviderConfig};
pub use reqwest_transport::{
    NativeTransport, ReqwestBody, ReqwestShellTransportLoader, ShellTransport,
};
pub use shell_detector::{
    EnvShellDetector, HeadlessDetector, SHELL_INTERNALS_VAR, SHELL_METADATA_VAR,
    SHELL_VERSION_VAR,
};
pub use system_clock::SystemClock;
