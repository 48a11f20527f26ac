//! Scripted collaborators for exercising the chat loop without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::stream;

use crate::chat::InputSource;
use crate::render::Renderer;
use crate::service::{CompletionService, FragmentStream};
use crate::types::{ContentPart, Message};
use crate::{Error, Result};

/// What the scripted service does for one call.
pub(crate) enum Reply {
    /// Stream these items, then end.
    Fragments(Vec<Result<ContentPart>>),
    /// Fail before any fragment is produced.
    Reject(Error),
}

impl Reply {
    pub(crate) fn text(pieces: &[&str]) -> Self {
        Reply::Fragments(pieces.iter().map(|p| Ok(ContentPart::text(*p))).collect())
    }
}

/// A [`CompletionService`] that replays canned replies and records what it
/// was asked.
#[derive(Default)]
pub(crate) struct ScriptedService {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedService {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionService for ScriptedService {
    async fn stream_completion(&self, messages: &[Message]) -> Result<FragmentStream> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Fragments(Vec::new()));
        match reply {
            Reply::Fragments(items) => Ok(Box::pin(stream::iter(items))),
            Reply::Reject(err) => Err(err),
        }
    }
}

/// A [`Renderer`] that keeps everything it is asked to print.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) labels: Vec<String>,
    pub(crate) text: String,
    pub(crate) errors: Vec<String>,
    pub(crate) infos: Vec<String>,
    pub(crate) finished: usize,
}

impl Renderer for RecordingRenderer {
    fn print_label(&mut self, label: &str) {
        self.labels.push(label.to_string());
    }

    fn print_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn print_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn print_info(&mut self, info: &str) {
        self.infos.push(info.to_string());
    }

    fn finish_response(&mut self) {
        self.finished += 1;
    }
}

/// An [`InputSource`] fed from a list of lines.
#[derive(Default)]
pub(crate) struct ScriptedInput {
    lines: VecDeque<Result<String>>,
    pub(crate) prompts: Vec<String>,
}

impl ScriptedInput {
    pub(crate) fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| Ok(l.to_string())).collect(),
            prompts: Vec::new(),
        }
    }

    pub(crate) fn then_fail(mut self, err: Error) -> Self {
        self.lines.push_back(Err(err));
        self
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front().transpose()
    }
}
