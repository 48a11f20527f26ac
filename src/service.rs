//! The remote completion capability seen by the chat session.

use std::pin::Pin;

use futures::Stream;

use crate::Result;
use crate::types::{ContentPart, Message};

/// A lazy, finite, forward-only sequence of reply fragments.
///
/// `None` marks the end of the reply and `Some(Err(_))` a failure.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<ContentPart>> + Send>>;

/// Something that can continue a conversation.
///
/// [`crate::ChatClient`] implements this against the hosted service; tests
/// implement it with scripted fragments.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Starts a completion for the ordered `messages` and returns the reply
    /// as a stream of fragments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or is rejected.
    async fn stream_completion(&self, messages: &[Message]) -> Result<FragmentStream>;
}
