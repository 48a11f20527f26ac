// Public modules
pub mod chat_completion_chunk;
pub mod chat_completion_request;
pub mod content_part;
pub mod error_object;
pub mod message;
pub mod role;

// Re-exports
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, ChunkDelta, FinishReason};
pub use chat_completion_request::ChatCompletionRequest;
pub use content_part::{ContentPart, ContentPartKind};
pub use error_object::{ErrorObject, ErrorResponse};
pub use message::Message;
pub use role::Role;
