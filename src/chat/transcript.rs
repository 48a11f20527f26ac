//! The ordered conversation history.

use crate::types::{Message, Role};

/// An append-only, ordered list of role-tagged messages.
///
/// The first message is always the single system message the transcript was
/// created with.  Nothing can remove or replace a message once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Starts a transcript with its system message.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// The system message that opens the conversation.
    pub fn system(&self) -> &Message {
        &self.messages[0]
    }

    /// Appends a user message.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Appends an assistant message.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message.
    pub fn last(&self) -> &Message {
        &self.messages[self.messages.len() - 1]
    }

    /// Number of messages, including the system message.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of messages with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role() == role).count()
    }
}
