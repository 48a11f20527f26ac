use serde::{Deserialize, Serialize};

use crate::types::{ContentPart, Role};

/// Why the model stopped producing a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of the reply.
    Stop,
    /// The token limit was reached.
    Length,
    /// Output was withheld by the content filter.
    ContentFilter,
    /// The model requested tool calls.
    ToolCalls,
    /// The model requested a function call.
    FunctionCall,
    /// A reason this client does not know about.
    #[serde(other)]
    Other,
}

/// The incremental change carried by a streamed choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Role of the author; present on the first delta only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Reply text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Refusal text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

/// One choice within a streamed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Index of the choice.
    #[serde(default)]
    pub index: u32,

    /// What changed.
    #[serde(default)]
    pub delta: ChunkDelta,

    /// Set on the final chunk of the choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// A single server-sent chunk of a streamed chat completion.
///
/// Azure sends a leading chunk with empty `choices` and prompt filter
/// results, so every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Completion identifier.
    #[serde(default)]
    pub id: String,

    /// Unix timestamp of creation.
    #[serde(default)]
    pub created: u64,

    /// Model that produced the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// The choices updated by this chunk.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    /// Content fragments carried by this chunk, in choice order.
    pub fn content_parts(&self) -> Vec<ContentPart> {
        let mut parts = Vec::new();
        for choice in &self.choices {
            if let Some(text) = &choice.delta.content {
                parts.push(ContentPart::text(text.clone()));
            }
            if let Some(refusal) = &choice.delta.refusal {
                parts.push(ContentPart::refusal(refusal.clone()));
            }
        }
        parts
    }

    /// The finish reason of the first choice that carries one.
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.choices
            .iter()
            .find_map(|choice| choice.finish_reason.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentPartKind;

    #[test]
    fn parse_content_chunk() {
        let data = r#"{"id":"chatcmpl-1","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"Hi"},"finish_reason":null}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(data).unwrap();
        assert_eq!(chunk.id, "chatcmpl-1");
        assert_eq!(chunk.content_parts(), vec![ContentPart::text("Hi")]);
        assert!(chunk.finish_reason().is_none());
    }

    #[test]
    fn parse_prompt_filter_chunk() {
        let data = r#"{"choices":[],"created":0,"id":"","model":"","object":"","prompt_filter_results":[{"prompt_index":0,"content_filter_results":{}}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(data).unwrap();
        assert!(chunk.content_parts().is_empty());
    }

    #[test]
    fn parse_role_and_finish() {
        let first = r#"{"id":"c","created":1,"choices":[{"index":0,"delta":{"role":"assistant","content":""}}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(first).unwrap();
        assert_eq!(chunk.choices[0].delta.role, Some(Role::Assistant));
        assert_eq!(chunk.content_parts()[0].renderable_text(), None);

        let last = r#"{"id":"c","created":1,"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(last).unwrap();
        assert_eq!(chunk.finish_reason(), Some(&FinishReason::Stop));
        assert!(chunk.content_parts().is_empty());
    }

    #[test]
    fn refusal_becomes_refusal_part() {
        let data = r#"{"choices":[{"index":0,"delta":{"refusal":"I can't help with that."}}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(data).unwrap();
        let parts = chunk.content_parts();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].kind, ContentPartKind::Refusal);
    }

    #[test]
    fn unknown_finish_reason() {
        let data = r#"{"choices":[{"index":0,"delta":{},"finish_reason":"something_new"}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(data).unwrap();
        assert_eq!(chunk.finish_reason(), Some(&FinishReason::Other));
    }
}
