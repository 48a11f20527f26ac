// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod config;
pub mod error;
pub mod observability;
pub mod render;
pub mod service;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{ChatClient, ChunkStream};
pub use client_logger::{ClientLogger, JsonLinesLogger};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use service::{CompletionService, FragmentStream};
pub use types::*;
