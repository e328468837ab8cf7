//! The client stack against a live relay server in stub mode.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use relaydesk_application::ports::ShellDetector;
use relaydesk_application::{
    DiagnosticClient, EnvironmentProbe, RelayClient, TransportKind, TransportSelector,
    relay_error_message,
};
use relaydesk_domain::{ChatMessage, ClientSettings, TransportRequest};
use relaydesk_infrastructure::adapters::SHELL_INTERNALS_VAR;
use relaydesk_infrastructure::{EnvShellDetector, NativeTransport, ReqwestShellTransportLoader};
use relaydesk_server::handlers::{MISSING_KEY_MESSAGE, PLACEHOLDER_REPLY};
use relaydesk_server::{AppState, ServerSettings, serve};
use tokio::net::TcpListener;

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::from_settings(&ServerSettings::default(), None).unwrap();
    tokio::spawn(serve(listener, state, std::future::pending()));
    addr
}

fn selector(addr: SocketAddr, in_shell: bool) -> Arc<TransportSelector> {
    let settings = ClientSettings {
        page_origin: format!("http://{addr}"),
        shell_api_url: format!("http://{addr}/api"),
        ..ClientSettings::default()
    };
    let detector: Arc<dyn ShellDetector> = Arc::new(EnvShellDetector::with_source(move |name| {
        (in_shell && name == SHELL_INTERNALS_VAR).then(String::new)
    }));
    let probe = Arc::new(EnvironmentProbe::new(Arc::clone(&detector)));
    let native = NativeTransport::new(&settings.page_origin).unwrap();
    let loader = ReqwestShellTransportLoader::new(&settings, detector);

    Arc::new(TransportSelector::new(
        probe,
        settings,
        Arc::new(native),
        Arc::new(loader),
    ))
}

#[tokio::test]
async fn diagnostics_pass_against_the_relay() {
    let addr = start_server().await;
    let diagnostics = DiagnosticClient::new(selector(addr, false));

    let ping = diagnostics.ping().await;
    assert!(ping.success, "{ping:?}");
    assert_eq!(ping.details.unwrap()["message"], "pong");

    let cors = diagnostics.check_cors().await;
    assert!(cors.success, "{cors:?}");
    let details = cors.details.unwrap();
    assert_eq!(details["cors"]["allowOrigin"], "*");
    assert_eq!(details["preflight"]["status"], 204);

    let connection = diagnostics.test_connection().await;
    assert!(connection.success, "{connection:?}");
}

#[tokio::test]
async fn shell_context_uses_the_shell_transport_and_origin() {
    let addr = start_server().await;
    let selector = selector(addr, true);

    let response = selector.send(TransportRequest::get("ping")).await.unwrap();
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response.transport(), TransportKind::Shell);
    assert_eq!(response.url(), format!("http://{addr}/api/ping"));
    assert_eq!(body["debug"]["origin"], "tauri://localhost");
}

#[tokio::test]
async fn stub_relays_answer_without_a_credential() {
    let addr = start_server().await;
    let relay = RelayClient::new(selector(addr, false));

    let reply = relay
        .send_chat_message(&[ChatMessage::user("hello")])
        .await
        .unwrap();
    assert_eq!(reply.content, PLACEHOLDER_REPLY);

    let error = relay.generate_image("a red fox").await.unwrap_err();
    assert_eq!(error.status, 400);
    assert_eq!(relay_error_message(&error).as_deref(), Some(MISSING_KEY_MESSAGE));
}

#[tokio::test]
async fn unknown_route_is_an_http_error() {
    let addr = start_server().await;
    let selector = selector(addr, false);

    let error = selector
        .send(TransportRequest::get("missing"))
        .await
        .unwrap_err();

    assert_eq!(error.status, 404);
    assert_eq!(error.url.as_deref(), Some("/api/missing"));
}
