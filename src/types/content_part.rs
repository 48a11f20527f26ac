use serde::{Deserialize, Serialize};

/// The kind of content carried by a streamed fragment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentPartKind {
    /// Ordinary reply text.
    Text,

    /// The model declined to answer.
    Refusal,
}

/// An incremental piece of an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPart {
    /// What this fragment carries.
    pub kind: ContentPartKind,

    /// The fragment text, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentPart {
    /// Create a text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ContentPartKind::Text,
            text: Some(text.into()),
        }
    }

    /// Create a refusal fragment.
    pub fn refusal(text: impl Into<String>) -> Self {
        Self {
            kind: ContentPartKind::Refusal,
            text: Some(text.into()),
        }
    }

    /// Returns the text when this is a text fragment with something in it.
    pub fn renderable_text(&self) -> Option<&str> {
        match (self.kind, self.text.as_deref()) {
            (ContentPartKind::Text, Some(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}
