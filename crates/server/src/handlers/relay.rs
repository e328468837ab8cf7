//! `/api/chat` and `/api/image`: forward to the generation provider.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relaydesk_application::ports::ProviderError;
use relaydesk_domain::{ChatReply, ChatRequest, ImageReply, ImageRequest, RelayErrorBody};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cors::{API_HEADERS, preflight_response};
use crate::state::AppState;

/// Chat reply sent when no provider credential is configured.
pub const PLACEHOLDER_REPLY: &str =
    "This is a placeholder reply because no API key is configured.";

/// Image error sent when no provider credential is configured.
pub const MISSING_KEY_MESSAGE: &str =
    "Missing OpenAI API key. Please add it to your environment as OPENAI_API_KEY.";

/// Failures of the relay endpoints, rendered as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request body could not be decoded.
    #[error("{0}")]
    InvalidBody(String),

    /// No provider credential is configured.
    #[error("{}", MISSING_KEY_MESSAGE)]
    MissingKey,

    /// The provider failed.
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl RelayError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MissingKey => StatusCode::BAD_REQUEST,
            Self::InvalidBody(_) | Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = RelayErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Answers the chat and image preflights.
pub async fn api_preflight() -> Response {
    preflight_response(API_HEADERS)
}

/// Relays a conversation and returns the assistant's reply.
///
/// # Errors
///
/// Returns a relay error for an undecodable body or a provider failure.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, RelayError> {
    let Json(request) = payload.map_err(|e| RelayError::InvalidBody(e.body_text()))?;
    info!(messages = request.messages.len(), "chat request received");

    let Some(provider) = &state.provider else {
        warn!("no API key configured, answering with placeholder");
        return Ok(Json(ChatReply {
            content: PLACEHOLDER_REPLY.to_string(),
        }));
    };

    let content = provider
        .complete_chat(&request.messages)
        .await
        .inspect_err(|e| error!(error = %e, "chat relay failed"))?;
    Ok(Json(ChatReply { content }))
}

/// Relays an image prompt and returns the image as base64.
///
/// # Errors
///
/// Returns a relay error for an undecodable body, a missing credential
/// or a provider failure.
pub async fn image(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<ImageReply>, RelayError> {
    let Json(request) = payload.map_err(|e| RelayError::InvalidBody(e.body_text()))?;
    info!(prompt_len = request.prompt.len(), "image request received");

    let Some(provider) = &state.provider else {
        warn!("no API key configured, refusing image request");
        return Err(RelayError::MissingKey);
    };

    let image = provider
        .generate_image(&request.prompt)
        .await
        .inspect_err(|e| error!(error = %e, "image relay failed"))?;
    Ok(Json(ImageReply {
        image: image.base64,
        revised_prompt: image.revised_prompt.unwrap_or(request.prompt),
    }))
}
