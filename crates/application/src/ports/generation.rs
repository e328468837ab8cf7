//! Text and image generation port

use async_trait::async_trait;
use relaydesk_domain::ChatMessage;
use thiserror::Error;

/// Errors reported by a generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider answered with an error status.
    #[error("provider returned {status}: {message}")]
    Upstream {
        /// HTTP status from the provider
        status: u16,
        /// The provider's error message
        message: String,
    },

    /// The provider could not be reached.
    #[error("provider unreachable: {0}")]
    Transport(String),

    /// The provider's answer did not have the expected shape.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

/// An image produced by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Base64-encoded image bytes
    pub base64: String,
    /// The prompt as rewritten by the provider, if it did so
    pub revised_prompt: Option<String>,
}

/// Port for the third-party text and image generation API.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generates the assistant's reply to a conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails.
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;

    /// Generates an image from a prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, ProviderError>;
}
