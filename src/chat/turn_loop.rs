//! The read, send, render loop.

use crate::chat::input::InputSource;
use crate::chat::session::ChatSession;
use crate::error::Result;
use crate::render::Renderer;
use crate::service::CompletionService;

/// Shown before every line of input.
pub const PROMPT: &str = "You: ";

/// Printed before each streamed reply.
pub const REPLY_LABEL: &str = "Assistant:";

/// Printed when a blank line ends the conversation.
pub const EXIT_MESSAGE: &str = "Exiting...";

/// Printed once before the first prompt.
pub const BANNER: &str = "Type your message and press Enter. Submit a blank line to exit.";

/// Runs turns until the user submits a blank line.
///
/// Each non-blank line becomes one turn.  A failed turn is reported through
/// the renderer and the loop moves on to the next prompt.  Returns the number
/// of turns attempted.
///
/// # Errors
///
/// Returns an error only if reading input fails.
pub async fn run<S, I>(
    session: &mut ChatSession<S>,
    input: &mut I,
    renderer: &mut dyn Renderer,
) -> Result<usize>
where
    S: CompletionService,
    I: InputSource + ?Sized,
{
    let mut turns = 0;
    loop {
        let line = input
            .read_line(PROMPT)?
            .filter(|line| !line.trim().is_empty());
        let Some(line) = line else {
            renderer.print_info(EXIT_MESSAGE);
            return Ok(turns);
        };

        turns += 1;
        renderer.print_label(REPLY_LABEL);
        if let Err(err) = session.send_streaming(&line, renderer).await {
            renderer.print_error(&err.to_string());
        }
    }
}
