//! Chat and image calls against the relay endpoints.

use std::sync::Arc;

use relaydesk_domain::{
    ApiError, ChatMessage, ChatReply, ChatRequest, ImageReply, ImageRequest, RelayErrorBody,
    TransportRequest, endpoints,
};
use tracing::warn;

use crate::response::TransportResponse;
use crate::transport_selector::TransportSelector;

/// Builds the `POST /chat` request used by both real chat traffic and
/// the connection test.
///
/// # Errors
///
/// Returns a validation error if the messages cannot be serialized.
pub fn chat_request(
    selector: &TransportSelector,
    messages: &[ChatMessage],
) -> Result<TransportRequest, ApiError> {
    let payload = ChatRequest {
        messages: messages.to_vec(),
    };
    TransportRequest::post_json(endpoints::CHAT, &payload)
        .map(|request| request.with_timeout(selector.settings().chat_timeout()))
        .map_err(|error| ApiError::validation(format!("could not encode chat request: {error}")))
}

/// Extracts the relay's `{"error": ...}` message from a failed call.
#[must_use]
pub fn relay_error_message(error: &ApiError) -> Option<String> {
    error
        .details
        .as_deref()
        .and_then(|body| serde_json::from_str::<RelayErrorBody>(body).ok())
        .map(|body| body.error)
}

/// Client for the chat and image relay endpoints.
#[derive(Clone)]
pub struct RelayClient {
    selector: Arc<TransportSelector>,
}

impl RelayClient {
    /// Creates a client over the given selector.
    #[must_use]
    pub const fn new(selector: Arc<TransportSelector>) -> Self {
        Self { selector }
    }

    /// Sends the conversation to the chat relay and returns the reply.
    ///
    /// A plain-text body is accepted as the reply content, since older
    /// relays answered that way when running without a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is empty.
    pub async fn send_chat_message(&self, messages: &[ChatMessage]) -> Result<ChatReply, ApiError> {
        let request = chat_request(&self.selector, messages)?;
        let response = self.selector.send(request).await?;
        Self::chat_reply(&response).await
    }

    /// Asks the image relay to generate an image.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty prompt, or the transport
    /// or parse error of the call.
    pub async fn generate_image(&self, prompt: &str) -> Result<ImageReply, ApiError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ApiError::validation("prompt must not be empty"));
        }

        let payload = ImageRequest {
            prompt: prompt.to_string(),
        };
        let request = TransportRequest::post_json(endpoints::IMAGE, &payload)
            .map_err(|error| ApiError::validation(format!("could not encode image request: {error}")))?
            .with_timeout(self.selector.settings().chat_timeout());

        let response = self.selector.send(request).await?;
        response.json::<ImageReply>().await
    }

    async fn chat_reply(response: &TransportResponse) -> Result<ChatReply, ApiError> {
        match response.json::<ChatReply>().await {
            Ok(reply) => Ok(reply),
            Err(parse_error) => {
                let text = response.text().await?.trim();
                if text.is_empty() || text.starts_with('{') {
                    return Err(parse_error);
                }
                warn!(url = response.url(), "chat relay answered with plain text");
                Ok(ChatReply {
                    content: text.to_string(),
                })
            }
        }
    }
}
