use tracing::{info, warn};

use super::is_blank;
use crate::client::Backend;
use crate::config::Language;
use crate::error::{Result, CHAT_ERROR_NOTICE};
use crate::lifecycle::{RequestLifecycle, Status};
use crate::models::{ChatReply, ChatRequest};
use crate::state::ChatMessage;

pub const GREETING: &str = "Hello! How can I assist you today? ✨";

/// Conversation with the assistant.
///
/// The message log is append-only and starts with a greeting. The user's
/// message is appended before the request goes out, so it stays visible
/// whatever the backend does.
#[derive(Debug, Clone)]
pub struct ChatWorkflow {
    pub input: String,
    messages: Vec<ChatMessage>,
    lifecycle: RequestLifecycle<()>,
    language: Language,
}

impl ChatWorkflow {
    pub fn new(language: Language) -> Self {
        Self {
            input: String::new(),
            messages: vec![ChatMessage::assistant(GREETING)],
            lifecycle: RequestLifecycle::new("chat"),
            language,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn status(&self) -> Status {
        self.lifecycle.status()
    }

    pub fn is_pending(&self) -> bool {
        self.lifecycle.is_pending()
    }

    /// Phase one: append the user message, clear the input, go `Pending`.
    ///
    /// Returns `None` for blank input or while a reply is outstanding; the
    /// input is left untouched in both cases.
    pub fn submit(&mut self) -> Option<ChatRequest> {
        if is_blank(&self.input) || !self.lifecycle.begin() {
            return None;
        }

        let message = std::mem::take(&mut self.input);
        info!("Sending chat message ({} chars)", message.chars().count());
        self.messages.push(ChatMessage::user(message.clone()));

        Some(ChatRequest {
            message,
            language: self.language,
        })
    }

    /// Phase two: append the reply or the fixed error notice, then go back to
    /// `Idle`. Returns the terminal status the submission reached.
    pub fn resolve(&mut self, outcome: Result<ChatReply>) -> Status {
        if !self.lifecycle.is_pending() {
            warn!("chat: reply arrived with no request outstanding, dropped");
            return self.lifecycle.status();
        }

        let reached = match outcome {
            Ok(reply) => {
                self.messages.push(ChatMessage::assistant(reply.response));
                self.lifecycle.succeed(());
                Status::Succeeded
            }
            Err(err) => {
                warn!("chat request failed: {}", err);
                self.messages.push(ChatMessage::assistant(CHAT_ERROR_NOTICE));
                self.lifecycle.fail();
                Status::Failed
            }
        };
        self.lifecycle.settle();
        reached
    }

    /// Both phases against `backend`. `None` when the submission was a no-op.
    pub async fn run(&mut self, backend: &dyn Backend) -> Option<Status> {
        let request = self.submit()?;
        let outcome = backend.chat(request).await;
        Some(self.resolve(outcome))
    }
}
