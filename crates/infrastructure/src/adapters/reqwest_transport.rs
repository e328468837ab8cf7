//! Transports implemented with reqwest.
//!
//! [`NativeTransport`] is the process's own HTTP stack and resolves
//! origin-relative URLs against the page origin. [`ShellTransport`] is
//! the network layer the desktop shell lends to the process: it only
//! accepts absolute URLs, announces the shell origin and keeps no
//! cookies. It is obtained through [`ReqwestShellTransportLoader`],
//! which fails when the shell does not expose its HTTP plugin.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relaydesk_application::ports::{
    BodyReader, OutgoingRequest, RawResponse, ShellDetector, ShellTransportLoader, Transport,
    TransportError, TransportKind,
};
use relaydesk_domain::{ClientSettings, Headers, HttpMethod};
use reqwest::{Client, Method, Url};
use tracing::debug;

const USER_AGENT: &str = concat!("RelayDesk/", env!("CARGO_PKG_VERSION"));
const HTTP_PLUGIN: &str = "http";

/// Body of a reqwest response, read on demand.
pub struct ReqwestBody(reqwest::Response);

#[async_trait]
impl BodyReader for ReqwestBody {
    async fn read_text(self: Box<Self>) -> Result<String, TransportError> {
        self.0
            .text()
            .await
            .map_err(|e| TransportError::Body(describe(&e)))
    }
}

/// The process's own HTTP transport.
pub struct NativeTransport {
    client: Client,
    page_origin: Url,
}

impl NativeTransport {
    /// Creates a native transport resolving relative URLs against
    /// `page_origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin is not an absolute URL or the
    /// client cannot be created.
    pub fn new(page_origin: &str) -> Result<Self, TransportError> {
        let page_origin = Url::parse(page_origin)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {page_origin}")))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            client,
            page_origin,
        })
    }

    /// Creates a native transport with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, page_origin: Url) -> Self {
        Self {
            client,
            page_origin,
        }
    }

    fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        match Url::parse(url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .page_origin
                .join(url)
                .map_err(|e| TransportError::InvalidUrl(format!("{e}: {url}"))),
            Err(e) => Err(TransportError::InvalidUrl(format!("{e}: {url}"))),
        }
    }
}

#[async_trait]
impl Transport for NativeTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Native
    }

    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        execute(&self.client, url, request, None).await
    }
}

/// The HTTP transport provided by the desktop shell.
pub struct ShellTransport {
    client: Client,
    origin: String,
}

impl ShellTransport {
    /// Creates a shell transport that announces `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(origin: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Shell(e.to_string()))?;
        Ok(Self {
            client,
            origin: origin.into(),
        })
    }
}

#[async_trait]
impl Transport for ShellTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Shell
    }

    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let url = Url::parse(&request.url).map_err(|e| {
            TransportError::InvalidUrl(format!("{e}: {} (shell requests need an absolute URL)", request.url))
        })?;
        execute(&self.client, url, request, Some(&self.origin))
            .await
            .map_err(|error| match error {
                TransportError::Other(message) => TransportError::Shell(message),
                other => other,
            })
    }
}

/// Loads the shell transport, checking that the shell exposes its HTTP
/// plugin first.
pub struct ReqwestShellTransportLoader {
    origin: String,
    detector: Arc<dyn ShellDetector>,
}

impl ReqwestShellTransportLoader {
    /// Creates a loader for the shell origin in `settings`.
    #[must_use]
    pub fn new(settings: &ClientSettings, detector: Arc<dyn ShellDetector>) -> Self {
        Self {
            origin: settings.shell_origin.clone(),
            detector,
        }
    }
}

#[async_trait]
impl ShellTransportLoader for ReqwestShellTransportLoader {
    async fn load(&self) -> Result<Arc<dyn Transport>, TransportError> {
        let globals = self
            .detector
            .globals()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        // An empty registry means the shell did not publish one.
        if let Some(metadata) = globals.as_ref().and_then(|g| g.metadata.as_ref())
            && !metadata.plugins.is_empty()
            && !metadata.has_plugin(HTTP_PLUGIN)
        {
            return Err(TransportError::Unavailable(
                "http plugin not registered".to_string(),
            ));
        }

        let transport = ShellTransport::new(self.origin.clone())
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        debug!(origin = %self.origin, "shell transport loaded");
        Ok(Arc::new(transport))
    }
}

async fn execute(
    client: &Client,
    url: Url,
    request: OutgoingRequest,
    origin: Option<&str>,
) -> Result<RawResponse, TransportError> {
    let timeout = request.timeout;
    let mut builder = client
        .request(to_reqwest_method(request.method), url)
        .timeout(timeout);

    for header in request.headers.iter() {
        builder = builder.header(&header.name, &header.value);
    }
    if let Some(origin) = origin
        && !request.headers.contains("Origin")
    {
        builder = builder.header("Origin", origin);
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| map_error(&e, timeout))?;

    let status = response.status().as_u16();
    let headers: Headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
        .collect();

    Ok(RawResponse {
        status,
        headers,
        body: Box::new(ReqwestBody(response)),
    })
}

/// Converts domain `HttpMethod` to reqwest `Method`.
const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// Maps reqwest errors to `TransportError`.
fn map_error(error: &reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        return TransportError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }

    let message = describe(error);
    if error.is_connect() {
        let host = error
            .url()
            .and_then(|u| u.host_str())
            .unwrap_or("unknown")
            .to_string();
        let lower = message.to_lowercase();
        if lower.contains("dns") || lower.contains("resolve") {
            return TransportError::Connection(format!("could not resolve {host}: {message}"));
        }
        return TransportError::Connection(message);
    }

    if error.is_builder() {
        return TransportError::InvalidUrl(message);
    }

    TransportError::Other(message)
}

/// Renders an error with its whole source chain, so that causes such as
/// "Connection refused" survive.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
