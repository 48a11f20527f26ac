//! Interactive chat application for an Azure OpenAI chat deployment.
//!
//! This binary provides a streaming REPL: each line you type is sent along
//! with the whole conversation so far, and the reply is printed as it
//! streams in.
//!
//! # Usage
//!
//! ```bash
//! export ENDPOINT_URL=https://my-resource.openai.azure.com/
//! export API_KEY=...
//! export DEPLOYMENT_NAME=gpt-4o
//!
//! # Basic usage
//! parley-chat
//!
//! # Pin a different API version
//! parley-chat --api-version 2025-01-01-preview
//!
//! # Record requests and stream chunks as JSON lines
//! parley-chat --log-file chat.jsonl
//!
//! # Disable colors (useful for piping output)
//! parley-chat --no-color
//! ```
//!
//! Submit a blank line to exit.

use std::process::ExitCode;

use arrrg::CommandLine;
use rustyline::DefaultEditor;

use parley::ClientConfig;
use parley::chat::{ChatArgs, ChatConfig, LaunchError, PlainTextRenderer, Renderer, launch};

/// Main entry point for the parley-chat application.
#[tokio::main]
async fn main() -> ExitCode {
    let (args, _) = ChatArgs::from_command_line_relaxed("parley-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            renderer.print_error(&format!("Failed to start line editor: {}", err));
            return ExitCode::FAILURE;
        }
    };

    match launch(&config, ClientConfig::from_env(), &mut editor, &mut renderer).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(LaunchError::Configuration(errors)) => {
            for err in errors {
                eprintln!("{err}");
            }
            ExitCode::FAILURE
        }
        Err(LaunchError::Setup(err)) => {
            renderer.print_error(&err.to_string());
            ExitCode::FAILURE
        }
        Err(LaunchError::Input(err)) => {
            renderer.print_error(&format!("Input error: {}", err));
            ExitCode::FAILURE
        }
    }
}
