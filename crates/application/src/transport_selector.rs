//! Dual-transport request dispatcher.
//!
//! Every request the client makes goes through [`TransportSelector::send`],
//! which resolves the endpoint against the right base URL, picks the
//! transport for the current environment and turns every failure into
//! an [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use relaydesk_domain::{ApiError, ClientSettings, HttpMethod, TransportRequest};
use tokio::sync::{OnceCell, broadcast};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::environment_probe::EnvironmentProbe;
use crate::ports::{OutgoingRequest, ShellTransportLoader, Transport, TransportError, TransportKind};
use crate::response::TransportResponse;

const EVENT_CAPACITY: usize = 64;

/// Observable dispatcher events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A request was handed to a transport.
    Dispatched {
        /// The transport used
        transport: TransportKind,
        /// HTTP method
        method: HttpMethod,
        /// Resolved URL
        url: String,
    },
    /// The shell transport could not be loaded and the native one is used.
    Fallback {
        /// Why the shell transport was unavailable
        reason: String,
    },
}

/// Chooses between the native and the shell transport and normalizes
/// their responses.
pub struct TransportSelector {
    probe: Arc<EnvironmentProbe>,
    settings: ClientSettings,
    native: Arc<dyn Transport>,
    shell_loader: Arc<dyn ShellTransportLoader>,
    shell: OnceCell<Arc<dyn Transport>>,
    events: broadcast::Sender<TransportEvent>,
}

impl TransportSelector {
    /// Creates a selector.
    ///
    /// The shell transport is loaded on first use inside the shell and
    /// kept once loaded; a failed load is retried on the next request.
    #[must_use]
    pub fn new(
        probe: Arc<EnvironmentProbe>,
        settings: ClientSettings,
        native: Arc<dyn Transport>,
        shell_loader: Arc<dyn ShellTransportLoader>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            probe,
            settings,
            native,
            shell_loader,
            shell: OnceCell::new(),
            events,
        }
    }

    /// Subscribes to dispatcher events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    /// Returns the client settings.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Returns the environment probe.
    #[must_use]
    pub const fn probe(&self) -> &Arc<EnvironmentProbe> {
        &self.probe
    }

    /// Returns the URL `endpoint` resolves to in the current environment.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the endpoint is empty.
    pub fn resolve_url(&self, endpoint: &str) -> Result<String, ApiError> {
        let endpoint = relaydesk_domain::normalize_endpoint(endpoint)
            .map_err(|error| ApiError::validation(error.to_string()))?;
        Ok(format!(
            "{}{endpoint}",
            self.settings.base_url(self.probe.quick_check())
        ))
    }

    /// Sends a request and returns a response with a 2xx status.
    ///
    /// # Errors
    ///
    /// - validation error (status 0) for an empty endpoint, nothing is sent
    /// - network or timeout error (status 0) when no response arrived
    /// - HTTP error carrying the status and, when readable, the body text
    pub async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        let url = self.resolve_url(&request.endpoint)?;
        let timeout = request
            .timeout
            .unwrap_or_else(|| self.settings.default_timeout());
        let transport = self.select_transport().await;
        let kind = transport.kind();
        // One deadline covers the call and the read of an error body.
        let deadline = Instant::now() + timeout;

        info!(%url, method = %request.method, transport = %kind, "dispatching request");
        let _ = self.events.send(TransportEvent::Dispatched {
            transport: kind,
            method: request.method,
            url: url.clone(),
        });

        let outgoing = OutgoingRequest {
            url: url.clone(),
            method: request.method,
            headers: request.headers,
            body: request.body,
            timeout,
        };

        let raw = match tokio::time::timeout_at(deadline, transport.send(outgoing)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(error)) => {
                warn!(%url, transport = %kind, %error, "request failed before a response");
                return Err(Self::transport_failure(&url, timeout, error));
            }
            Err(_) => {
                warn!(%url, transport = %kind, ?timeout, "request timed out");
                return Err(ApiError::timeout(url, timeout));
            }
        };

        let response = TransportResponse::new(url.clone(), kind, raw);
        debug!(%url, status = response.status(), "response received");

        if !response.ok() {
            let body = Self::read_error_body(&response, deadline).await;
            warn!(%url, status = response.status(), "request returned an error status");
            return Err(ApiError::http(response.status(), url, body));
        }

        Ok(response)
    }

    async fn select_transport(&self) -> Arc<dyn Transport> {
        if !self.probe.quick_check() {
            return Arc::clone(&self.native);
        }

        match self
            .shell
            .get_or_try_init(|| self.shell_loader.load())
            .await
        {
            Ok(shell) => Arc::clone(shell),
            Err(error) => {
                warn!(%error, "shell transport unavailable, falling back to native transport");
                let _ = self.events.send(TransportEvent::Fallback {
                    reason: error.to_string(),
                });
                Arc::clone(&self.native)
            }
        }
    }

    async fn read_error_body(response: &TransportResponse, deadline: Instant) -> Option<String> {
        match tokio::time::timeout_at(deadline, response.text()).await {
            Ok(Ok(text)) => Some(text.to_string()),
            Ok(Err(error)) => {
                debug!(%error, "could not read error response body");
                None
            }
            Err(_) => {
                debug!("deadline elapsed while reading error response body");
                None
            }
        }
    }

    fn transport_failure(url: &str, timeout: Duration, error: TransportError) -> ApiError {
        match error {
            TransportError::Timeout { .. } => ApiError::timeout(url, timeout),
            other => ApiError::network(url, other.to_string()),
        }
    }
}
