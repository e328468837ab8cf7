//! RelayDesk Application - Environment probing, transports and diagnostics
//!
//! This crate defines the application layer with:
//! - Port traits (shell detection, transports, generation provider, clock)
//! - The environment probe and transport selector
//! - Relay and diagnostic clients built on the selector

pub mod diagnostics;
pub mod environment_probe;
pub mod ports;
pub mod relay_client;
pub mod response;
pub mod transport_selector;

pub use diagnostics::DiagnosticClient;
pub use environment_probe::EnvironmentProbe;
pub use ports::{
    BodyReader, Clock, GeneratedImage, GenerationProvider, OutgoingRequest, ProviderError,
    RawResponse, ShellApiError, ShellDetector, ShellTransportLoader, TextBody, Transport,
    TransportError, TransportKind,
};
pub use relay_client::{RelayClient, chat_request, relay_error_message};
pub use response::TransportResponse;
pub use transport_selector::{TransportEvent, TransportSelector};
