//! Line input for the chat loop.

use std::io;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::{Error, Result};

/// A source of user input lines.
pub trait InputSource {
    /// Shows `prompt` and reads one line.
    ///
    /// Returns `Ok(None)` when no line is coming: the input is exhausted or
    /// the user interrupted the prompt.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

impl InputSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(err) => Err(Error::io(
                format!("failed to read input: {err}"),
                io::Error::other(err.to_string()),
            )),
        }
    }
}
