use serde::{Deserialize, Serialize};

/// The error detail returned by the service, either as a response body or
/// inside a streamed event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Machine-readable error code (e.g. `DeploymentNotFound`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human-readable error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Parameter that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,

    /// Error category, when the service reports one.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorObject {
    /// The most specific label for this error: its type, falling back to its code.
    pub fn label(&self) -> Option<String> {
        self.error_type.clone().or_else(|| self.code.clone())
    }
}

/// A payload of the shape `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error detail.
    pub error: ErrorObject,
}
