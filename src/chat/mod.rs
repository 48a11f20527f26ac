//! Chat application module for interactive streamed conversations.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! parley client library. It supports:
//!
//! - Streaming responses with real-time fragment display
//! - An in-memory transcript that grows by one exchange per turn
//! - Per-turn error recovery
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`transcript`]: The ordered conversation history
//! - [`session`]: Transcript ownership and the streamed turn
//! - [`input`]: Line input for the loop
//! - [`turn_loop`]: The read, send, render loop
//! - [`launch`]: Startup from settings to the first prompt

mod config;
mod input;
mod launch;
mod session;
mod transcript;
mod turn_loop;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use config::{ChatArgs, ChatConfig};
pub use input::InputSource;
pub use launch::{LaunchError, launch};
pub use session::{ChatSession, SYSTEM_PROMPT, SessionStats, TurnOutcome};
pub use transcript::Transcript;
pub use turn_loop::{BANNER, EXIT_MESSAGE, PROMPT, REPLY_LABEL, run};
