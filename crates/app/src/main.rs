//! RelayDesk terminal client - Main Entry Point
//!
//! Wires the environment probe, the transport selector and the relay and
//! diagnostic clients, then runs the requested command.

mod chat;
mod cli;
mod client;
mod image;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use relaydesk_application::TransportEvent;
use relaydesk_domain::DiagnosticReport;
use relaydesk_infrastructure::load_client_settings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::client::Services;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = load_client_settings().context("could not load settings")?;
    if let Some(origin) = cli.origin {
        settings.page_origin = origin;
    }
    if let Some(url) = cli.shell_api_url {
        settings.shell_api_url = url;
    }

    let services = Services::new(settings)?;
    watch_fallbacks(&services);

    let json = cli.json;
    let success = match cli.command {
        Command::Env => {
            let info = services.probe.full_info().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let api_url = services.selector.settings().base_url(info.is_shell);
                println!("{}", render::environment(&info, api_url));
            }
            true
        }
        Command::Ping => show(json, "ping", &services.diagnostics.ping().await)?,
        Command::Cors => show(json, "cors", &services.diagnostics.check_cors().await)?,
        Command::Test => show(json, "connection", &services.diagnostics.test_connection().await)?,
        Command::Diagnose => {
            let info = services.probe.full_info().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let api_url = services.selector.settings().base_url(info.is_shell);
                println!("{}\n", render::environment(&info, api_url));
            }
            let ping = show(json, "ping", &services.diagnostics.ping().await)?;
            let cors = show(json, "cors", &services.diagnostics.check_cors().await)?;
            let test = show(json, "connection", &services.diagnostics.test_connection().await)?;
            ping && cors && test
        }
        Command::Chat => {
            chat::run(&services.relay).await?;
            true
        }
        Command::Image { prompt, out } => match services.relay.generate_image(&prompt).await {
            Ok(reply) => {
                let bytes = image::save(&reply.image, &out).await?;
                println!("Saved {bytes} bytes to {}", out.display());
                println!("Prompt: {}", reply.revised_prompt);
                true
            }
            Err(error) => {
                eprintln!("{}", render::api_error(&error));
                false
            }
        },
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn show(json: bool, name: &str, report: &DiagnosticReport) -> anyhow::Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", render::report(name, report));
    }
    Ok(report.success)
}

/// Tells the user when the shell transport could not be used.
fn watch_fallbacks(services: &Services) {
    let mut events = services.selector.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let TransportEvent::Fallback { reason } = event {
                eprintln!("note: shell transport unavailable ({reason}), using native transport");
            }
        }
    });
}
