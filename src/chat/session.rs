//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the transcript
//! and drives one streamed turn at a time.

use std::time::Instant;

use futures::StreamExt;

use crate::chat::transcript::Transcript;
use crate::error::Result;
use crate::observability::{CHAT_FRAGMENTS, CHAT_TURN_DURATION, CHAT_TURN_FAILURES, CHAT_TURNS};
use crate::render::Renderer;
use crate::service::CompletionService;
use crate::types::Message;

/// The fixed system message every conversation starts with.
pub const SYSTEM_PROMPT: &str = "You are a concise assistant.";

/// The result of a turn whose stream completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The assembled reply, as appended to the transcript.
    pub text: String,
    /// How many non-empty text fragments made up the reply.
    pub fragments: usize,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The number of messages in the conversation, system message included.
    pub message_count: usize,
    /// Turns whose stream completed.
    pub completed_turns: u64,
    /// Turns that ended in an error.
    pub failed_turns: u64,
    /// Text fragments rendered across all turns, failed ones included.
    pub fragments_received: u64,
}

/// A chat session that manages conversation state and API interactions.
///
/// The session maintains the transcript and streams replies from a
/// [`CompletionService`].
pub struct ChatSession<S: CompletionService> {
    service: S,
    transcript: Transcript,
    completed_turns: u64,
    failed_turns: u64,
    fragments_received: u64,
}

impl<S: CompletionService> ChatSession<S> {
    /// Creates a new chat session whose transcript holds only the system
    /// message.
    pub fn new(service: S) -> Self {
        Self {
            service,
            transcript: Transcript::new(SYSTEM_PROMPT),
            completed_turns: 0,
            failed_turns: 0,
            fragments_received: 0,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Adds the user message to the transcript
    /// 2. Requests a completion for the whole transcript
    /// 3. Renders text fragments as they arrive
    /// 4. Adds the assembled reply to the transcript
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the stream fails part way.
    /// The user message stays in the transcript; the partial reply does not.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<TurnOutcome> {
        CHAT_TURNS.click();
        let started = Instant::now();

        self.transcript.push_user(user_input);

        let outcome = stream_reply(
            &self.service,
            self.transcript.messages(),
            renderer,
            &mut self.fragments_received,
        )
        .await;
        CHAT_TURN_DURATION.add(started.elapsed().as_secs_f64());

        match outcome {
            Ok(outcome) => {
                renderer.finish_response();
                self.transcript.push_assistant(outcome.text.clone());
                self.completed_turns += 1;
                Ok(outcome)
            }
            Err(err) => {
                CHAT_TURN_FAILURES.click();
                self.failed_turns += 1;
                Err(err)
            }
        }
    }

    /// Returns the conversation so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.transcript.message_count()
    }

    /// Returns the service this session talks to.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            message_count: self.message_count(),
            completed_turns: self.completed_turns,
            failed_turns: self.failed_turns,
            fragments_received: self.fragments_received,
        }
    }
}

async fn stream_reply<S: CompletionService>(
    service: &S,
    messages: &[Message],
    renderer: &mut dyn Renderer,
    fragments_received: &mut u64,
) -> Result<TurnOutcome> {
    let mut fragments = service.stream_completion(messages).await?;
    let mut text = String::new();
    let mut count = 0;
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        if let Some(piece) = fragment.renderable_text() {
            renderer.print_text(piece);
            text.push_str(piece);
            count += 1;
            *fragments_received += 1;
            CHAT_FRAGMENTS.click();
        }
    }
    Ok(TurnOutcome {
        text,
        fragments: count,
    })
}
