//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// RelayDesk terminal client
#[derive(Debug, Parser)]
#[command(name = "relaydesk", version)]
#[command(about = "Chat and image generation through the RelayDesk relay", long_about = None)]
pub struct Cli {
    /// Origin the relay is served from (overrides the configured page origin)
    #[arg(long, global = true, value_name = "URL")]
    pub origin: Option<String>,

    /// Absolute API URL used inside the desktop shell
    #[arg(long, global = true, value_name = "URL")]
    pub shell_api_url: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the detected runtime environment
    Env,
    /// Ping the relay
    Ping,
    /// Check the relay's CORS configuration
    Cors,
    /// Send a test message through the chat relay
    Test,
    /// Run every diagnostic in turn
    Diagnose,
    /// Start an interactive chat
    Chat,
    /// Generate an image and save it
    Image {
        /// What to draw
        prompt: String,
        /// Where to write the image
        #[arg(short, long, default_value = "relaydesk-image.png")]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn image_takes_prompt_and_output() {
        let cli = Cli::try_parse_from(["relaydesk", "image", "a red fox", "-o", "fox.png"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Command::Image { prompt, out }) if prompt == "a red fox" && out == PathBuf::from("fox.png")
        ));
    }
}
