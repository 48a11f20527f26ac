//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the
//! configuration structure the binary resolves from it.  Connection settings
//! come from the environment; see [`crate::ClientConfig`].

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::config::{ClientConfig, DEFAULT_API_VERSION};

/// Command-line arguments for the parley-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// API version sent with each request.
    #[arrrg(optional, "API version (default: 2024-06-01)", "VERSION")]
    pub api_version: Option<String>,

    /// File that receives a JSON-lines log of requests and stream chunks.
    #[arrrg(optional, "Append a JSON-lines request/stream log to PATH", "PATH")]
    pub log_file: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat run.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// API version sent with each request.
    pub api_version: String,

    /// Where to write the request/stream log, if anywhere.
    pub log_file: Option<PathBuf>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - API version: 2024-06-01
    /// - Log file: none
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            log_file: None,
            use_color: true,
        }
    }

    /// Sets the API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets the log file.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Applies the settings that affect the connection.
    pub fn apply(&self, client: ClientConfig) -> ClientConfig {
        client.with_api_version(self.api_version.clone())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            api_version: args
                .api_version
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            log_file: args.log_file.map(PathBuf::from),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.api_version, "2024-06-01");
        assert!(config.log_file.is_none());
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            api_version: Some("2025-01-01-preview".to_string()),
            log_file: Some("chat.jsonl".to_string()),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.api_version, "2025-01-01-preview");
        assert_eq!(config.log_file, Some(PathBuf::from("chat.jsonl")));
        assert!(!config.use_color);
    }

    #[test]
    fn blank_api_version_falls_back() {
        let args = ChatArgs {
            api_version: Some("  ".to_string()),
            ..ChatArgs::default()
        };
        assert_eq!(ChatConfig::from(args).api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_api_version("2024-10-21")
            .with_log_file(Some(PathBuf::from("log.jsonl")))
            .without_color();
        assert_eq!(config.api_version, "2024-10-21");
        assert_eq!(config.log_file, Some(PathBuf::from("log.jsonl")));
        assert!(!config.use_color);

        let client = config.apply(ClientConfig::new(
            Url::parse("https://example.openai.azure.com/").unwrap(),
            "key",
            "gpt-4o",
        ));
        assert_eq!(client.api_version, "2024-10-21");
    }
}
