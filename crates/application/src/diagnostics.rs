//! Connectivity diagnostics shown by the connection test panel.
//!
//! Each probe is one linear attempt through [`TransportSelector::send`]
//! and always produces a [`DiagnosticReport`], never an error.

use std::sync::Arc;
use std::time::Instant;

use relaydesk_domain::{
    ApiError, ChatMessage, CorsHeaders, DiagnosticReport, Headers, TransportRequest, endpoints,
};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::relay_client::chat_request;
use crate::response::TransportResponse;
use crate::transport_selector::TransportSelector;

const UNPARSABLE_PING: &str = "Response received but not valid JSON";

/// Runs ping, CORS and connection diagnostics.
#[derive(Clone)]
pub struct DiagnosticClient {
    selector: Arc<TransportSelector>,
}

impl DiagnosticClient {
    /// Creates a diagnostic client.
    #[must_use]
    pub const fn new(selector: Arc<TransportSelector>) -> Self {
        Self { selector }
    }

    /// Sends `GET /ping` and reports the parsed reply.
    pub async fn ping(&self) -> DiagnosticReport {
        let request = TransportRequest::get(endpoints::PING)
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json");

        let started = Instant::now();
        let response = match self.selector.send(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "ping failed");
                return DiagnosticReport::failed(error);
            }
        };
        info!(elapsed_ms = started.elapsed().as_secs_f64() * 1000.0, "ping answered");

        let details = match response.json::<Value>().await {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "ping reply is not JSON");
                json!({ "message": UNPARSABLE_PING })
            }
        };
        DiagnosticReport::passed("Ping to API successful", Some(details))
    }

    /// Sends an OPTIONS preflight followed by a GET to `/ping` and
    /// reports the CORS headers the server echoed.
    ///
    /// A failed preflight does not stop the GET; both outcomes are
    /// included in the report.
    pub async fn check_cors(&self) -> DiagnosticReport {
        let origin = self.origin().to_string();
        let url = self
            .selector
            .resolve_url(endpoints::PING)
            .unwrap_or_else(|_| endpoints::PING.to_string());

        let preflight_request = TransportRequest::options(endpoints::PING)
            .with_header("Origin", origin.clone())
            .with_header("Access-Control-Request-Method", "GET")
            .with_header("Access-Control-Request-Headers", "Content-Type");
        let preflight = match self.selector.send(preflight_request).await {
            Ok(response) => {
                info!(status = response.status(), "CORS preflight succeeded");
                PreflightOutcome::from_response(&response)
            }
            Err(error) => {
                warn!(%error, "CORS preflight failed");
                PreflightOutcome::from_error(&error)
            }
        };

        let request = TransportRequest::get(endpoints::PING)
            .with_header("Origin", origin)
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json");
        let response = match self.selector.send(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "CORS GET failed");
                return DiagnosticReport {
                    success: false,
                    message: "CORS test failed".to_string(),
                    details: Some(json!({
                        "url": url,
                        "preflight": preflight.to_json(),
                        "error": error.message,
                    })),
                    error: Some(error),
                };
            }
        };

        let cors = cors_headers(response.headers()).or(preflight.cors.clone());
        let response_data = match response.text().await {
            Ok(text) => serde_json::from_str::<Value>(text).unwrap_or_else(|_| json!({ "raw": text })),
            Err(error) => json!({ "raw": Value::Null, "error": error.message }),
        };

        DiagnosticReport::passed(
            "CORS test successful",
            Some(json!({
                "url": url,
                "status": response.status(),
                "transport": response.transport().as_str(),
                "preflight": preflight.to_json(),
                "cors": cors,
                "responseData": response_data,
            })),
        )
    }

    /// Sends a minimal chat request through the regular chat path.
    pub async fn test_connection(&self) -> DiagnosticReport {
        let messages = [ChatMessage::user("Hello").with_id("test-connection")];
        let request = match chat_request(&self.selector, &messages) {
            Ok(request) => request,
            Err(error) => return DiagnosticReport::failed(error),
        };

        match self.selector.send(request).await {
            Ok(response) if response.ok() => {
                info!("connection test successful");
                DiagnosticReport::passed("Connection to API successful", None)
            }
            Ok(response) => DiagnosticReport::failed(ApiError::http(
                response.status(),
                response.url(),
                None,
            )),
            Err(error) => {
                warn!(%error, "connection test failed");
                DiagnosticReport::failed(error)
            }
        }
    }

    fn origin(&self) -> &str {
        let settings = self.selector.settings();
        if self.selector.probe().quick_check() {
            &settings.shell_origin
        } else {
            &settings.page_origin
        }
    }
}

/// What the preflight request produced.
#[derive(Debug, Clone)]
struct PreflightOutcome {
    status: u16,
    ok: bool,
    cors: CorsHeaders,
    error: Option<String>,
}

impl PreflightOutcome {
    fn from_response(response: &TransportResponse) -> Self {
        Self {
            status: response.status(),
            ok: response.ok(),
            cors: cors_headers(response.headers()),
            error: None,
        }
    }

    fn from_error(error: &ApiError) -> Self {
        Self {
            status: error.status,
            ok: false,
            cors: CorsHeaders::default(),
            error: Some(error.message.clone()),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "status": self.status,
            "ok": self.ok,
            "cors": self.cors,
            "error": self.error,
        })
    }
}

fn cors_headers(headers: &Headers) -> CorsHeaders {
    let get = |name: &str| headers.get(name).map(str::to_string);
    CorsHeaders {
        allow_origin: get("access-control-allow-origin"),
        allow_methods: get("access-control-allow-methods"),
        allow_headers: get("access-control-allow-headers"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use relaydesk_domain::HttpMethod;

    use crate::ports::{TransportError, TransportKind};
    use crate::transport_selector::tests::{MockTransport, Reply, browser_selector};

    fn diagnostics(replies: Vec<Reply>) -> (DiagnosticClient, Arc<MockTransport>) {
        let native = MockTransport::new(TransportKind::Native, replies);
        let selector = Arc::new(browser_selector(Arc::clone(&native)));
        (DiagnosticClient::new(selector), native)
    }

    fn cors_reply(status: u16, body: &str) -> Reply {
        Reply::Respond {
            status,
            headers: Headers::new()
                .with("Access-Control-Allow-Origin", "*")
                .with("Access-Control-Allow-Methods", "GET, OPTIONS")
                .with("Access-Control-Allow-Headers", "Content-Type, Authorization"),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn ping_success_reports_parsed_body() {
        let (client, native) = diagnostics(vec![Reply::json(
            200,
            &json!({"message": "pong", "timestamp": "2024-01-01T00:00:00Z"}),
        )]);

        let report = client.ping().await;

        assert!(report.success);
        let details = report.details.unwrap();
        assert_eq!(details["message"], "pong");
        assert_eq!(details["timestamp"], "2024-01-01T00:00:00Z");
        let sent = &native.recorded()[0];
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.url, "/api/ping");
    }

    #[tokio::test]
    async fn unparsable_ping_is_still_a_success() {
        let (client, _) = diagnostics(vec![Reply::Respond {
            status: 200,
            headers: Headers::new(),
            body: "<html>pong</html>".to_string(),
        }]);

        let report = client.ping().await;

        assert!(report.success);
        assert_eq!(report.details, Some(json!({"message": UNPARSABLE_PING})));
    }

    #[tokio::test]
    async fn ping_failure_is_reported_not_raised() {
        let (client, _) = diagnostics(vec![Reply::Fail(TransportError::Connection(
            "Connection refused".to_string(),
        ))]);

        let report = client.ping().await;

        assert!(!report.success);
        assert_eq!(report.error.unwrap().status, 0);
    }

    #[tokio::test]
    async fn cors_check_echoes_allow_origin() {
        let (client, native) = diagnostics(vec![
            cors_reply(204, ""),
            cors_reply(200, r#"{"message":"pong"}"#),
        ]);

        let report = client.check_cors().await;

        assert!(report.success);
        let details = report.details.unwrap();
        assert_eq!(details["cors"]["allowOrigin"], "*");
        assert_eq!(details["cors"]["allowMethods"], "GET, OPTIONS");
        assert_eq!(details["preflight"]["status"], 204);
        assert_eq!(details["responseData"]["message"], "pong");

        let sent = native.recorded();
        assert_eq!(sent[0].method, HttpMethod::Options);
        assert_eq!(sent[0].headers.get("Origin"), Some("http://127.0.0.1:3000"));
        assert_eq!(
            sent[0].headers.get("Access-Control-Request-Method"),
            Some("GET")
        );
        assert_eq!(sent[1].method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn failed_preflight_does_not_abort_the_get() {
        let (client, native) = diagnostics(vec![
            Reply::Respond {
                status: 405,
                headers: Headers::new(),
                body: "method not allowed".to_string(),
            },
            cors_reply(200, "pong"),
        ]);

        let report = client.check_cors().await;

        assert!(report.success);
        let details = report.details.unwrap();
        assert_eq!(details["preflight"]["status"], 405);
        assert_eq!(details["preflight"]["ok"], false);
        assert_eq!(details["cors"]["allowOrigin"], "*");
        assert_eq!(details["responseData"]["raw"], "pong");
        assert_eq!(native.recorded().len(), 2);
    }

    #[tokio::test]
    async fn cors_get_failure_reports_both_outcomes() {
        let (client, _) = diagnostics(vec![
            cors_reply(204, ""),
            Reply::Fail(TransportError::Connection("reset by peer".to_string())),
        ]);

        let report = client.check_cors().await;

        assert!(!report.success);
        assert_eq!(report.message, "CORS test failed");
        let details = report.details.unwrap();
        assert_eq!(details["preflight"]["cors"]["allowOrigin"], "*");
        assert!(details["error"].as_str().unwrap().contains("reset by peer"));
    }

    #[tokio::test]
    async fn connection_test_uses_the_chat_path() {
        let (client, native) = diagnostics(vec![Reply::json(200, &json!({"content": "hi"}))]);

        let report = client.test_connection().await;

        assert!(report.success);
        assert_eq!(report.message, "Connection to API successful");
        let sent = &native.recorded()[0];
        assert_eq!(sent.url, "/api/chat");
        assert!(sent.body.as_deref().unwrap().contains("test-connection"));
    }

    #[tokio::test]
    async fn connection_test_failure_carries_status() {
        let (client, _) = diagnostics(vec![Reply::json(500, &json!({"error": "boom"}))]);

        let report = client.test_connection().await;

        assert!(!report.success);
        assert_eq!(report.error.unwrap().status, 500);
    }
}
