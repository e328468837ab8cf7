//! RelayDesk relay server.
//!
//! Serves the diagnostic endpoints the client's connection test probes and
//! relays chat and image requests to the generation provider. Without a
//! provider credential the relays run in stub mode.

pub mod cors;
pub mod handlers;
pub mod settings;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use relaydesk_domain::endpoints;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use settings::ServerSettings;
pub use state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            endpoints::PING,
            get(handlers::ping).options(handlers::ping_preflight),
        )
        .route(
            endpoints::TEST,
            get(handlers::test).options(handlers::test_preflight),
        )
        .route(
            endpoints::CHAT,
            post(handlers::chat).options(handlers::api_preflight),
        )
        .route(
            endpoints::IMAGE,
            post(handlers::image).options(handlers::api_preflight),
        )
        .fallback(cors::api_fallback)
        .layer(middleware::from_fn(cors::api_cors));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
pub async fn run_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
    })
    .await
}

/// Serves on an already bound listener until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if serving fails.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, stub = state.is_stub(), "relay server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
