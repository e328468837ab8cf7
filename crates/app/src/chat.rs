//! Interactive chat session.

use std::path::PathBuf;

use relaydesk_application::{RelayClient, relay_error_message};
use relaydesk_domain::{ApiError, ChatMessage, ChatReply, ChatRole, generate_id};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{image, render};

/// Reply shown when the relay answered with empty content.
pub const EMPTY_REPLY: &str = "Sorry, I could not generate a reply.";

/// Reply shown when the user asks the chat for an image.
pub const IMAGE_HINT: &str =
    "Image requests are handled by the image generator. Use /image <prompt> to create one.";

/// Shown for an `/image` command without a prompt.
pub const IMAGE_USAGE: &str = "usage: /image <prompt>";

const ACTION_WORDS: &[&str] = &["generate", "create", "draw", "show", "make", "paint"];
const SUBJECT_WORDS: &[&str] = &["image", "photo", "picture", "illustration", "drawing"];

/// Returns true if the message asks for an image rather than a reply.
pub fn is_image_request(message: &str) -> bool {
    let lower = message.to_lowercase();
    ACTION_WORDS.iter().any(|w| lower.contains(w)) && SUBJECT_WORDS.iter().any(|w| lower.contains(w))
}

/// Returns the prompt of an `/image` command, empty when none was given.
/// Lines that are not the command yield `None`.
pub fn image_command(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("/image")?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim())
}

/// What to do with a line the user typed.
#[derive(Debug, PartialEq, Eq)]
pub enum Turn {
    /// Send this conversation to the relay.
    Send(Vec<ChatMessage>),
    /// The message was answered locally.
    Answered,
    /// Nothing to do: blank input or a send is in flight.
    Ignored,
}

/// Conversation history plus the busy flag that serializes sends.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    busy: bool,
}

impl ChatSession {
    /// Returns the conversation so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns true while a send is in flight.
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Records the user's input and decides whether it must be sent.
    pub fn begin(&mut self, input: &str) -> Turn {
        let input = input.trim();
        if input.is_empty() || self.busy {
            return Turn::Ignored;
        }

        self.messages.push(ChatMessage::user(input));
        if is_image_request(input) {
            self.messages.push(ChatMessage::assistant(IMAGE_HINT));
            return Turn::Answered;
        }

        self.busy = true;
        Turn::Send(self.messages.clone())
    }

    /// Records the outcome of a send and returns the message to show.
    pub fn finish(&mut self, result: Result<ChatReply, ApiError>) -> &ChatMessage {
        self.busy = false;
        let message = match result {
            Ok(reply) if reply.content.trim().is_empty() => ChatMessage::assistant(EMPTY_REPLY),
            Ok(reply) => ChatMessage::assistant(reply.content),
            Err(error) => {
                let text = relay_error_message(&error).unwrap_or_else(|| error.user_message());
                ChatMessage {
                    role: ChatRole::System,
                    content: format!("Error: {text}"),
                    id: Some(generate_id()),
                }
            }
        };
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Forgets the conversation.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Runs the chat loop on stdin until EOF or `/quit`.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run(relay: &RelayClient) -> anyhow::Result<()> {
    println!("Start a conversation by typing a message below.");
    println!("Commands: /image <prompt>, /clear, /quit");

    let mut session = ChatSession::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut images = 0_u32;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }

        if let Some(prompt) = image_command(line) {
            if prompt.is_empty() {
                println!("{IMAGE_USAGE}");
                continue;
            }
            images += 1;
            let out = PathBuf::from(format!("relaydesk-image-{images}.png"));
            match relay.generate_image(prompt).await {
                Ok(reply) => match image::save(&reply.image, &out).await {
                    Ok(bytes) => println!("image: saved {bytes} bytes to {}", out.display()),
                    Err(error) => println!("image: {error:#}"),
                },
                Err(error) => println!("{}", render::api_error(&error)),
            }
            continue;
        }

        match session.begin(line) {
            Turn::Send(messages) => {
                println!("assistant: ...");
                let result = relay.send_chat_message(&messages).await;
                let message = session.finish(result);
                println!("{}: {}", message.role, message.content);
            }
            Turn::Answered => {
                if let Some(message) = session.messages().last() {
                    println!("{}: {}", message.role, message.content);
                }
            }
            Turn::Ignored => debug!(busy = session.is_busy(), "input ignored"),
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_requests_are_detected() {
        assert!(is_image_request("Can you generate an image of a cat?"));
        assert!(is_image_request("Draw me a picture"));
        assert!(!is_image_request("Describe this image"));
        assert!(!is_image_request("Create a poem"));
    }

    #[test]
    fn sends_whole_history_and_blocks_while_busy() {
        let mut session = ChatSession::default();

        let Turn::Send(messages) = session.begin("hello") else {
            panic!("expected a send");
        };
        assert_eq!(messages.len(), 1);
        assert!(session.is_busy());
        assert_eq!(session.begin("again"), Turn::Ignored);

        session.finish(Ok(ChatReply {
            content: "hi!".to_string(),
        }));
        assert!(!session.is_busy());

        let Turn::Send(messages) = session.begin("how are you") else {
            panic!("expected a send");
        };
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]);
    }

    #[test]
    fn image_command_needs_a_prompt() {
        assert_eq!(image_command("/image a red fox"), Some("a red fox"));
        assert_eq!(image_command("/image"), Some(""));
        assert_eq!(image_command("/image   "), Some(""));
        assert_eq!(image_command("/images please"), None);
        assert_eq!(image_command("draw an image"), None);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = ChatSession::default();
        assert_eq!(session.begin("   "), Turn::Ignored);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn failures_become_system_messages() {
        let mut session = ChatSession::default();
        let _ = session.begin("hello");

        let message = session.finish(Err(ApiError::http(
            500,
            "/api/chat",
            Some(r#"{"error":"quota exceeded"}"#.to_string()),
        )));

        assert_eq!(message.role, ChatRole::System);
        assert_eq!(message.content, "Error: quota exceeded");
    }

    #[test]
    fn empty_reply_gets_apology() {
        let mut session = ChatSession::default();
        let _ = session.begin("hello");

        let message = session.finish(Ok(ChatReply {
            content: String::new(),
        }));

        assert_eq!(message.content, EMPTY_REPLY);
    }

    #[test]
    fn image_request_is_answered_locally() {
        let mut session = ChatSession::default();

        assert_eq!(session.begin("please draw a picture of a fox"), Turn::Answered);
        assert_eq!(session.messages()[1].content, IMAGE_HINT);
        assert!(!session.is_busy());
    }
}
