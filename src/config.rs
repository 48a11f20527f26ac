//! Connection settings for the chat-completions endpoint.
//!
//! The settings are read once at startup into a [`ClientConfig`] that is then
//! handed to [`crate::ChatClient`]; nothing else in the crate looks at the
//! process environment.

use std::env;
use std::fmt;

use url::Url;

use crate::error::Error;

/// Environment variable holding the service base address.
pub const ENDPOINT_URL_VAR: &str = "ENDPOINT_URL";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "API_KEY";

/// Environment variable holding the deployment name.
pub const DEPLOYMENT_NAME_VAR: &str = "DEPLOYMENT_NAME";

/// API version sent with every request unless overridden.
pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the service, e.g. `https://my-resource.openai.azure.com/`.
    pub endpoint: Url,
    /// Secret sent in the `api-key` header.
    pub api_key: String,
    /// Deployment that selects the model.
    pub deployment: String,
    /// Value of the `api-version` query parameter.
    pub api_version: String,
}

impl ClientConfig {
    /// Creates a config from already-validated parts.
    pub fn new(endpoint: Url, api_key: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            endpoint,
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Overrides the API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns one configuration error per variable that is absent, blank, or
    /// unusable.
    pub fn from_env() -> Result<Self, Vec<Error>> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns one configuration error per variable that is absent, blank, or
    /// unusable, in the order `ENDPOINT_URL`, `API_KEY`, `DEPLOYMENT_NAME`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Vec<Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();
        let endpoint = required(&lookup, ENDPOINT_URL_VAR, &mut errors)
            .and_then(|raw| match parse_endpoint(&raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    errors.push(err);
                    None
                }
            });
        let api_key = required(&lookup, API_KEY_VAR, &mut errors);
        let deployment = required(&lookup, DEPLOYMENT_NAME_VAR, &mut errors);
        match (endpoint, api_key, deployment) {
            (Some(endpoint), Some(api_key), Some(deployment)) if errors.is_empty() => {
                Ok(Self::new(endpoint, api_key, deployment))
            }
            _ => Err(errors),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

fn required<F>(lookup: &F, name: &str, errors: &mut Vec<Error>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => {
            errors.push(Error::configuration(
                format!("{name} environment variable is not set."),
                Some(name.to_string()),
            ));
            None
        }
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|err| {
        Error::configuration(
            format!("{ENDPOINT_URL_VAR} is not a valid URL: {err}"),
            Some(ENDPOINT_URL_VAR.to_string()),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::configuration(
            format!("{ENDPOINT_URL_VAR} must be an http(s) address, got {raw}"),
            Some(ENDPOINT_URL_VAR.to_string()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn complete_environment() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("ENDPOINT_URL", "https://example.openai.azure.com/"),
            ("API_KEY", "secret"),
            ("DEPLOYMENT_NAME", "gpt-4o"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint.as_str(), "https://example.openai.azure.com/");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.deployment, "gpt-4o");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn missing_api_key() {
        let errors = ClientConfig::from_lookup(lookup_from(&[
            ("ENDPOINT_URL", "https://example.openai.azure.com/"),
            ("DEPLOYMENT_NAME", "gpt-4o"),
        ]))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "API_KEY environment variable is not set."
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let errors = ClientConfig::from_lookup(lookup_from(&[
            ("ENDPOINT_URL", "   "),
            ("API_KEY", ""),
            ("DEPLOYMENT_NAME", "\t"),
        ]))
        .unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "ENDPOINT_URL environment variable is not set.",
                "API_KEY environment variable is not set.",
                "DEPLOYMENT_NAME environment variable is not set.",
            ]
        );
    }

    #[test]
    fn endpoint_must_be_http() {
        let errors = ClientConfig::from_lookup(lookup_from(&[
            ("ENDPOINT_URL", "mailto:someone@example.com"),
            ("API_KEY", "secret"),
            ("DEPLOYMENT_NAME", "gpt-4o"),
        ]))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("must be an http(s) address"));

        let errors = ClientConfig::from_lookup(lookup_from(&[
            ("ENDPOINT_URL", "not a url"),
            ("API_KEY", "secret"),
            ("DEPLOYMENT_NAME", "gpt-4o"),
        ]))
        .unwrap_err();
        assert!(errors[0].to_string().contains("is not a valid URL"));
    }

    #[test]
    fn debug_redacts_key() {
        let config = ClientConfig::new(
            Url::parse("https://example.openai.azure.com/").unwrap(),
            "super-secret",
            "gpt-4o",
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
