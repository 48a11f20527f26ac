//! Startup for the chat binary: settings, client, banner, then the loop.

use std::fs::OpenOptions;
use std::sync::Arc;

use crate::chat::config::ChatConfig;
use crate::chat::input::InputSource;
use crate::chat::session::ChatSession;
use crate::chat::turn_loop::{BANNER, run};
use crate::client::ChatClient;
use crate::client_logger::JsonLinesLogger;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::render::Renderer;

/// Why [`launch`] ended with a failure.
#[derive(Debug)]
pub enum LaunchError {
    /// Connection settings were missing or unusable.  Every problem is
    /// listed and no prompt was shown.
    Configuration(Vec<Error>),
    /// The client or its log file could not be set up.
    Setup(Error),
    /// Reading input failed after the loop started.
    Input(Error),
}

/// Resolves a client from `settings` and `config`, prints the banner and
/// runs turns until the user exits.
///
/// Returns the number of turns attempted.
pub async fn launch<I>(
    config: &ChatConfig,
    settings: std::result::Result<ClientConfig, Vec<Error>>,
    input: &mut I,
    renderer: &mut dyn Renderer,
) -> std::result::Result<usize, LaunchError>
where
    I: InputSource + ?Sized,
{
    let settings = settings.map_err(LaunchError::Configuration)?;
    let client = connect(config, settings).map_err(LaunchError::Setup)?;
    let mut session = ChatSession::new(client);

    renderer.print_info(&format!("{BANNER}\n"));
    run(&mut session, input, renderer)
        .await
        .map_err(LaunchError::Input)
}

fn connect(config: &ChatConfig, settings: ClientConfig) -> Result<ChatClient> {
    let client = ChatClient::new(config.apply(settings))?;
    let Some(path) = &config.log_file else {
        return Ok(client);
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(format!("failed to open log file {}: {e}", path.display()), e))?;
    Ok(client.with_logger(Arc::new(JsonLinesLogger::new(file))))
}
