//! OpenAI-compatible generation provider.

use std::time::Duration;

use async_trait::async_trait;
use relaydesk_application::ports::{GeneratedImage, GenerationProvider, ProviderError};
use relaydesk_domain::ChatMessage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default base URL of the provider API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Bearer credential
    pub api_key: String,
    /// Model used for chat completions
    pub chat_model: String,
    /// Model used for image generation
    pub image_model: String,
    /// Deadline of each provider call
    pub timeout: Duration,
}

/// Calls the chat completion and image generation endpoints.
pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiProvider {
    /// Creates a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(concat!("RelayDesk/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a provider with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, mut config: ProviderConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self { client, config }
    }

    async fn post<B: Serialize + Sync, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        let url = format!("{}{path}", self.config.base_url);
        debug!(%url, "calling generation provider");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            warn!(%url, status, "generation provider returned an error");
            return Err(ProviderError::Upstream { status, message });
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn complete_chat(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: &self.config.chat_model,
            messages: messages
                .iter()
                .map(|m| CompletionMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };

        let response: CompletionResponse = self.post("/chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no completion choices".to_string()))
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let request = ImageGenerationRequest {
            model: &self.config.image_model,
            prompt,
            n: 1,
            response_format: "b64_json",
        };

        let response: ImageGenerationResponse =
            self.post("/images/generations", &request).await?;
        let image = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("no image returned".to_string()))?;
        let base64 = image
            .b64_json
            .ok_or_else(|| ProviderError::InvalidResponse("image has no b64_json".to_string()))?;

        Ok(GeneratedImage {
            base64,
            revised_prompt: image.revised_prompt,
        })
    }
}
