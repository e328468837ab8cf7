//! RelayDesk Domain - Core types
//!
//! This crate defines the domain model shared by the RelayDesk client,
//! the relay server and the terminal front end.
//! All types here are pure Rust with no I/O dependencies.

pub mod api_error;
pub mod diagnostic;
pub mod endpoints;
pub mod environment;
pub mod error;
pub mod id;
pub mod relay;
pub mod request;
pub mod settings;

pub use api_error::{ApiError, ApiErrorKind};
pub use diagnostic::{CorsHeaders, DiagnosticReport};
pub use environment::{
    EnvironmentInfo, PLATFORM_BROWSER, PLATFORM_SERVER, PLATFORM_SHELL, PLATFORM_UNKNOWN,
    ShellGlobals, ShellMetadata, ShellWindow, host_os_label,
};
pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use relay::{
    ChatMessage, ChatReply, ChatRequest, ChatRole, ImageReply, ImageRequest, RelayErrorBody,
};
pub use request::{Header, Headers, HttpMethod, TransportRequest, normalize_endpoint};
pub use settings::ClientSettings;
