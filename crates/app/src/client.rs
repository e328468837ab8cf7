//! Wiring of the application services.

use std::sync::Arc;

use anyhow::Context;
use relaydesk_application::ports::ShellDetector;
use relaydesk_application::{DiagnosticClient, EnvironmentProbe, RelayClient, TransportSelector};
use relaydesk_domain::ClientSettings;
use relaydesk_infrastructure::{EnvShellDetector, NativeTransport, ReqwestShellTransportLoader};

/// The services a command needs.
pub struct Services {
    /// Process-wide environment probe
    pub probe: Arc<EnvironmentProbe>,
    /// Chat and image relay client
    pub relay: RelayClient,
    /// Connectivity diagnostics
    pub diagnostics: DiagnosticClient,
    /// The dispatcher both clients share
    pub selector: Arc<TransportSelector>,
}

impl Services {
    /// Builds the services over the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the native transport cannot be created.
    pub fn new(settings: ClientSettings) -> anyhow::Result<Self> {
        let detector: Arc<dyn ShellDetector> = Arc::new(EnvShellDetector::new());
        let probe = EnvironmentProbe::install_global(Arc::clone(&detector));

        let native = NativeTransport::new(&settings.page_origin)
            .with_context(|| format!("invalid page origin {}", settings.page_origin))?;
        let loader = ReqwestShellTransportLoader::new(&settings, detector);

        let selector = Arc::new(TransportSelector::new(
            Arc::clone(&probe),
            settings,
            Arc::new(native),
            Arc::new(loader),
        ));

        Ok(Self {
            probe,
            relay: RelayClient::new(Arc::clone(&selector)),
            diagnostics: DiagnosticClient::new(Arc::clone(&selector)),
            selector,
        })
    }
}
