//! Transport layer for talking to an agent.
//!
//! Provides the `Transport` trait for abstracting over how JSON-RPC requests
//! reach the agent, and `JsonRpcTransport` for JSON-RPC over HTTP.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{A2AError, A2AResult};
use crate::types::{JsonRpcRequest, JsonRpcResponse};

use super::sse::{EventStream, SseStream};

/// Transport abstraction for A2A communication.
///
/// Implementations send one JSON-RPC request and hand back either the
/// response envelope or a stream of decoded events.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a JSON-RPC request and receive a JSON-RPC response.
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<JsonRpcResponse>;

    /// Send a JSON-RPC request and subscribe to the resulting event stream.
    ///
    /// The stream holds the connection; dropping it releases the connection.
    async fn send_stream(&self, request: &JsonRpcRequest) -> A2AResult<EventStream>;
}

/// HTTP settings shared by the transport and agent discovery.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Request timeout. `None` (the default) imposes no timeout.
    pub timeout: Option<Duration>,
    /// Additional HTTP headers to include on every request.
    pub headers: HashMap<String, String>,
}

impl TransportConfig {
    /// Build a `reqwest::Client` carrying these settings.
    ///
    /// Headers with an invalid name or value are skipped with a warning.
    pub fn build_client(&self) -> A2AResult<reqwest::Client> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &self.headers {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    default_headers.insert(name, val);
                }
                _ => tracing::warn!("skipping invalid HTTP header '{key}'"),
            }
        }

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| A2AError::Transport(format!("failed to build HTTP client: {e}")))
    }
}

/// JSON-RPC over HTTP transport using `reqwest`.
///
/// Requests are POSTed to the endpoint as `application/json`. Streaming
/// requests ask for `text/event-stream` and yield one event per frame.
///
/// # Example
///
/// ```no_run
/// use a2a_provider::client::JsonRpcTransport;
///
/// let transport = JsonRpcTransport::new("http://localhost:41241/");
/// ```
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    client: reqwest::Client,
    url: String,
}

impl JsonRpcTransport {
    /// Create a transport targeting the given endpoint URL with a default client.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Create a transport with custom configuration.
    pub fn with_config(url: impl Into<String>, config: &TransportConfig) -> A2AResult<Self> {
        Ok(Self::with_client(url, config.build_client()?))
    }

    /// Create a transport with an existing `reqwest::Client`.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Returns the URL this transport sends requests to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn post(&self, request: &JsonRpcRequest) -> A2AResult<reqwest::RequestBuilder> {
        let body = serde_json::to_vec(request).map_err(|e| {
            A2AError::Transport(format!("failed to serialize JSON-RPC request: {e}"))
        })?;
        Ok(self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body))
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn send(&self, request: &JsonRpcRequest) -> A2AResult<JsonRpcResponse> {
        tracing::debug!(method = %request.method, url = %self.url, "sending JSON-RPC request");

        let response = self.post(request)?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(A2AError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| A2AError::Transport(format!("failed to read response body: {e}")))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            A2AError::InvalidJson(format!("failed to parse JSON-RPC response: {e}"))
        })
    }

    async fn send_stream(&self, request: &JsonRpcRequest) -> A2AResult<EventStream> {
        tracing::debug!(method = %request.method, url = %self.url, "opening event stream");

        let builder = self.post(request)?.header("Accept", "text/event-stream");
        Ok(Box::pin(SseStream::subscribe(builder)?))
    }
}
