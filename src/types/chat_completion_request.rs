use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Body of a chat-completions request.
///
/// The deployment named in the URL selects the model, so the body carries
/// only the conversation and the streaming switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The conversation so far, oldest first.
    pub messages: Vec<Message>,

    /// Whether the server should stream the reply as server-sent events.
    #[serde(default)]
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Create a streaming request for the given messages.
    pub fn new_streaming(messages: Vec<Message>) -> Self {
        Self {
            messages,
            stream: true,
        }
    }
}

impl From<&[Message]> for ChatCompletionRequest {
    fn from(messages: &[Message]) -> Self {
        Self::new_streaming(messages.to_vec())
    }
}
