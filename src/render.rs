//! Output rendering for the chat loop.
//!
//! This module provides the renderer trait and a plain-text implementation
//! that writes streamed reply text to stdout and errors to stderr.

use std::io::{self, Stdout, Write};

/// ANSI escape code for bold text (used for the speaker label).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for cyan text (used for the speaker label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering streaming output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Print the label that introduces a reply.
    fn print_label(&mut self, label: &str);

    /// Print a chunk of regular response text.
    ///
    /// This is called incrementally as fragments are streamed from the API and
    /// must reach the terminal before it returns.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines after streaming.
    fn finish_response(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    line_start: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            line_start: true,
        }
    }

    /// Whether ANSI styling is emitted.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    fn write(&mut self, text: &str) {
        let mut out = self.stdout.lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
        if let Some(last) = text.chars().last() {
            self.line_start = last == '\n';
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_label(&mut self, label: &str) {
        if self.use_color {
            self.write(&format!("{ANSI_BOLD}{ANSI_CYAN}{label}{ANSI_RESET}\n"));
        } else {
            self.write(&format!("{label}\n"));
        }
    }

    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn print_error(&mut self, error: &str) {
        if !self.line_start {
            self.write("\n");
        }
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        if !self.line_start {
            self.write("\n");
        }
        self.write(&format!("{info}\n"));
    }

    fn finish_response(&mut self) {
        self.write("\n");
    }
}
