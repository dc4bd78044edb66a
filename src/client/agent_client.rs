//! Protocol facade over one agent endpoint.

use std::sync::Arc;

use futures::stream;

use crate::error::{A2AError, A2AResult};
use crate::normalize::{decode_event, unwrap_envelope};
use crate::types::{
    AgentCapabilities, AgentCard, JsonRpcRequest, Message, SendMessageConfiguration,
    SendMessageParams, SendMessageResponse, StreamResponse,
};

use super::card_resolver::{CapabilitiesCache, CardResolver};
use super::sse::EventStream;
use super::transport::{JsonRpcTransport, Transport};

/// JSON-RPC method of a single-result exchange.
pub const METHOD_MESSAGE_SEND: &str = "message/send";

/// JSON-RPC method of a streamed exchange.
pub const METHOD_MESSAGE_STREAM: &str = "message/stream";

/// Client for one remote agent.
///
/// Owns the JSON-RPC transport, agent discovery and the capabilities lookup.
/// The card is fetched once per endpoint and shared through the
/// [`CapabilitiesCache`] handed in at construction.
///
/// # Example
///
/// ```no_run
/// use a2a_provider::client::AgentClient;
/// use a2a_provider::types::{Message, Part, Role};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AgentClient::new("http://localhost:41241");
/// let message = Message::new("msg-1", Role::User, vec![Part::text("Hello")]);
/// let response = client.send(message, true).await?;
/// println!("{:?}", response);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AgentClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    resolver: CardResolver,
    cache: Arc<CapabilitiesCache>,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AgentClient {
    /// Client for `base_url` with default HTTP settings and a private cache.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new(), Arc::default())
    }

    /// Client sharing an HTTP client and a capabilities cache.
    ///
    /// JSON-RPC requests are POSTed to `{base_url}/`.
    pub fn with_http_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        cache: Arc<CapabilitiesCache>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let transport = JsonRpcTransport::with_client(format!("{base_url}/"), client.clone());
        Self {
            base_url,
            transport: Arc::new(transport),
            resolver: CardResolver::with_client(client),
            cache,
        }
    }

    /// Replace the transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the card resolver.
    pub fn with_resolver(mut self, resolver: CardResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The agent base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The cache this client reads capabilities from.
    pub fn cache(&self) -> &Arc<CapabilitiesCache> {
        &self.cache
    }

    /// The agent card, from the cache or freshly discovered.
    pub async fn agent_card(&self) -> A2AResult<Arc<AgentCard>> {
        self.cache.get_or_resolve(&self.base_url, &self.resolver).await
    }

    /// The agent's advertised capabilities.
    pub async fn capabilities(&self) -> A2AResult<AgentCapabilities> {
        Ok(self.agent_card().await?.capabilities.clone())
    }

    /// Send one message and wait for its single result.
    ///
    /// `blocking` asks the agent to hold the response until the task
    /// settles, accepting text output only.
    pub async fn send(&self, message: Message, blocking: bool) -> A2AResult<SendMessageResponse> {
        let value = self.send_raw(message, blocking).await?;
        decode_send_result(value)
    }

    /// Like [`send`](Self::send), returning the undecoded `result` object.
    pub async fn send_raw(&self, message: Message, blocking: bool) -> A2AResult<serde_json::Value> {
        let configuration = blocking.then(SendMessageConfiguration::blocking_text);
        let request = build_request(METHOD_MESSAGE_SEND, message, configuration)?;
        let response = self.transport.send(&request).await?;
        unwrap_envelope(response)
    }

    /// Send one message and subscribe to its results.
    ///
    /// When the agent does not advertise streaming, no subscription is
    /// opened: one blocking send is performed and its result is returned as
    /// a single-element stream.
    pub async fn send_streaming(&self, message: Message) -> A2AResult<EventStream> {
        let card = self.agent_card().await?;

        if !card.supports_streaming() {
            tracing::debug!(
                agent = %self.base_url,
                "agent does not stream; falling back to a blocking send"
            );
            let response = self.send(message, true).await?;
            let event = StreamResponse::from(response);
            return Ok(Box::pin(stream::once(async move { Ok(event) })));
        }

        let request = build_request(METHOD_MESSAGE_STREAM, message, None)?;
        self.transport.send_stream(&request).await
    }
}

fn build_request(
    method: &str,
    message: Message,
    configuration: Option<SendMessageConfiguration>,
) -> A2AResult<JsonRpcRequest> {
    let params = SendMessageParams {
        message,
        configuration,
    };
    let params = serde_json::to_value(&params)
        .map_err(|e| A2AError::Transport(format!("failed to serialize params: {e}")))?;
    Ok(JsonRpcRequest::new(
        uuid::Uuid::new_v4().to_string(),
        method,
        Some(params),
    ))
}

/// Decode a `message/send` result. Update events are not valid here.
pub(crate) fn decode_send_result(value: serde_json::Value) -> A2AResult<SendMessageResponse> {
    match decode_event(value)? {
        StreamResponse::Task(task) => Ok(SendMessageResponse::Task(task)),
        StreamResponse::Message(message) => Ok(SendMessageResponse::Message(message)),
        other => Err(A2AError::MalformedEvent(format!(
            "unexpected '{}' in message/send result; expected task or message",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JsonRpcResponse, Part, Role};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers every request with the same result and remembers the methods.
    struct CannedTransport {
        result: serde_json::Value,
        methods: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: &JsonRpcRequest) -> A2AResult<JsonRpcResponse> {
            self.methods.lock().unwrap().push(request.method.clone());
            Ok(serde_json::from_value(json!({
                "jsonrpc": "2.0",
                "id": request.id,
                "result": self.result
            }))
            .unwrap())
        }

        async fn send_stream(&self, _request: &JsonRpcRequest) -> A2AResult<EventStream> {
            Err(A2AError::Transport("streaming not available".to_string()))
        }
    }

    #[tokio::test]
    async fn custom_transport_carries_send() {
        let transport = Arc::new(CannedTransport {
            result: json!({
                "kind": "message",
                "messageId": "r1",
                "role": "agent",
                "parts": [{"kind": "text", "text": "pong"}]
            }),
            methods: Mutex::new(Vec::new()),
        });
        let client = AgentClient::new("http://unused.example").with_transport(transport.clone());

        let message = Message::new("m1", Role::User, vec![Part::text("ping")]);
        match client.send(message, true).await.unwrap() {
            SendMessageResponse::Message(reply) => assert_eq!(reply.message_id, "r1"),
            other => panic!("expected message, got {other:?}"),
        }
        assert_eq!(*transport.methods.lock().unwrap(), vec!["message/send"]);
    }

    #[test]
    fn blocking_request_carries_text_configuration() {
        let message = Message::new("m1", Role::User, vec![Part::text("hi")]);
        let request = build_request(
            METHOD_MESSAGE_SEND,
            message,
            Some(SendMessageConfiguration::blocking_text()),
        )
        .unwrap();

        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.method, "message/send");
        let params = request.params.unwrap();
        assert_eq!(params["configuration"]["blocking"], json!(true));
        assert_eq!(params["configuration"]["acceptedOutputModes"], json!(["text/plain"]));
        assert_eq!(params["message"]["messageId"], json!("m1"));
    }

    #[test]
    fn stream_request_has_no_configuration() {
        let message = Message::new("m1", Role::User, vec![Part::text("hi")]);
        let request = build_request(METHOD_MESSAGE_STREAM, message, None).unwrap();
        assert!(request.params.unwrap().get("configuration").is_none());
    }

    #[test]
    fn update_event_is_not_a_send_result() {
        let err = decode_send_result(json!({
            "kind": "status-update",
            "taskId": "t1",
            "contextId": "c1",
            "status": {"state": "working"},
            "final": false
        }))
        .unwrap_err();
        assert!(matches!(err, A2AError::MalformedEvent(_)));
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = AgentClient::new("http://localhost:41241//");
        assert_eq!(client.base_url(), "http://localhost:41241");
    }
}
