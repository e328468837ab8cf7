//! Wire types of the chat and image relay endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions for the model
    System,
    /// The person chatting
    User,
    /// The model
    Assistant,
}

impl ChatRole {
    /// Returns the role as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message
    pub role: ChatRole,
    /// Message text
    pub content: String,
    /// Client-side identifier; the relay ignores it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChatMessage {
    /// Creates a user message with a fresh id.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            id: Some(crate::id::generate_id()),
        }
    }

    /// Creates an assistant message with a fresh id.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            id: Some(crate::id::generate_id()),
        }
    }

    /// Replaces the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The conversation so far, oldest first
    pub messages: Vec<ChatMessage>,
}

/// Successful body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The generated reply
    pub content: String,
}

/// Body of `POST /image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Text description of the image
    pub prompt: String,
}

/// Successful body of `POST /image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReply {
    /// Base64-encoded image data
    pub image: String,
    /// The prompt the image was generated from
    pub revised_prompt: String,
}

/// Error body returned by both relay endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayErrorBody {
    /// What went wrong
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chat_request_matches_the_relay_format() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("Hello").with_id("test-connection")],
        };
        let json = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({"messages": [{"role": "user", "content": "Hello", "id": "test-connection"}]})
        );
    }

    #[test]
    fn messages_without_id_are_accepted() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#)
                .unwrap_or(ChatRequest { messages: vec![] });
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].id, None);
    }

    #[test]
    fn roles_round_trip_through_strings() {
        assert_eq!("assistant".parse::<ChatRole>(), Ok(ChatRole::Assistant));
        assert!("robot".parse::<ChatRole>().is_err());
        assert_eq!(ChatRole::System.to_string(), "system");
    }
}
