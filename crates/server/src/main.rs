//! RelayDesk relay server binary.

use anyhow::Context;
use relaydesk_server::settings::api_key_from_env;
use relaydesk_server::{AppState, ServerSettings};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ServerSettings::from_env().context("invalid server settings")?;
    let addr = settings
        .addr()
        .with_context(|| format!("invalid address {}:{}", settings.host, settings.port))?;

    let api_key = api_key_from_env();
    if api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set, relays answer with placeholders");
    }
    let state = AppState::from_settings(&settings, api_key)?;

    tracing::info!(
        "Starting RelayDesk relay server v{}",
        env!("CARGO_PKG_VERSION")
    );

    relaydesk_server::run_server(addr, state).await?;

    Ok(())
}
