//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod generation;
mod shell_detector;
mod transport;

pub use clock::Clock;
pub use generation::{GeneratedImage, GenerationProvider, ProviderError};
pub use shell_detector::{ShellApiError, ShellDetector};
pub use transport::{
    BodyReader, OutgoingRequest, RawResponse, ShellTransportLoader, TextBody, Transport,
    TransportError, TransportKind,
};
