use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::Stream;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_TTFB,
};
use crate::service::{CompletionService, FragmentStream};
use crate::sse::process_sse;
use crate::types::{ChatCompletionChunk, ChatCompletionRequest, ContentPart, ErrorResponse, Message};

/// A boxed stream of decoded chat-completion chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>;

/// Client for an Azure OpenAI chat-completions deployment.
///
/// No overall timeout is set on the HTTP client; a streamed reply is read
/// until the service ends it or the connection fails.
#[derive(Clone)]
pub struct ChatClient {
    config: ClientConfig,
    client: ReqwestClient,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl ChatClient {
    /// Create a new client from resolved configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            config,
            client,
            logger: None,
        })
    }

    /// Attaches a logger that sees every request and streamed chunk.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The chat-completions address for the configured deployment.
    pub fn completions_url(&self) -> Result<Url> {
        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| Error::url("endpoint cannot be used as a base address", None))?
            .pop_if_empty()
            .extend([
                "openai",
                "deployments",
                self.config.deployment.as_str(),
                "chat",
                "completions",
            ]);
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        let api_key = HeaderValue::from_str(&self.config.api_key).map_err(|_| {
            Error::configuration(
                "API_KEY contains characters that cannot be sent in a header",
                Some("API_KEY".to_string()),
            )
        })?;
        headers.insert("api-key", api_key);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let request_id = ["x-request-id", "apim-request-id"]
            .iter()
            .find_map(|name| response.headers().get(*name))
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .map(|parsed| parsed.error)
            .unwrap_or_default();
        let error_type = detail.label();
        let error_message = detail.message.unwrap_or_else(|| error_body.clone());

        match status_code {
            400 => Error::bad_request(error_message, detail.param),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message, request_id),
        }
    }

    /// Send a chat-completions request and get a streaming response.
    ///
    /// Returns a stream of chunks that can be processed incrementally.
    pub async fn stream(&self, mut request: ChatCompletionRequest) -> Result<ChunkStream> {
        request.stream = true;
        let url = self.completions_url()?;
        let headers = self.default_headers()?;

        if let Some(logger) = &self.logger {
            logger.log_request(url.as_str(), &request);
        }

        CLIENT_REQUESTS.click();
        let started = Instant::now();
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(format!("Request timed out: {}", e))
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            });
        CLIENT_REQUEST_DURATION.add(started.elapsed().as_secs_f64());

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => return self.fail(Self::process_error_response(response).await),
            Err(err) => return self.fail(err),
        };

        Ok(Box::pin(process_sse(response.bytes_stream())))
    }

    fn fail<T>(&self, err: Error) -> Result<T> {
        CLIENT_REQUEST_ERRORS.click();
        if let Some(logger) = &self.logger {
            logger.log_error(&err);
        }
        Err(err)
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl CompletionService for ChatClient {
    async fn stream_completion(&self, messages: &[Message]) -> Result<FragmentStream> {
        let started = Instant::now();
        let chunks = self.stream(ChatCompletionRequest::from(messages)).await?;

        let logger = self.logger.clone();
        let mut awaiting_first = true;
        let fragments = chunks
            .inspect(move |item| {
                if awaiting_first {
                    awaiting_first = false;
                    STREAM_TTFB.add(started.elapsed().as_secs_f64());
                }
                if let Some(logger) = &logger {
                    match item {
                        Ok(chunk) => logger.log_stream_chunk(chunk),
                        Err(err) => logger.log_error(err),
                    }
                }
            })
            .flat_map(|item| {
                let parts: Vec<Result<ContentPart>> = match item {
                    Ok(chunk) => chunk.content_parts().into_iter().map(Ok).collect(),
                    Err(err) => vec![Err(err)],
                };
                stream::iter(parts)
            });

        Ok(Box::pin(fragments))
    }
}
