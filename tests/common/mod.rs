//! Shared test utilities: an in-process mock A2A agent.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use a2a_provider::error::A2AError;
use a2a_provider::prompt::StreamPart;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// How the mock answers one JSON-RPC method.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `{"jsonrpc","id","result"}` as a JSON body.
    Result(Value),
    /// `{"jsonrpc","id","error"}` as a JSON body.
    Error { code: i64, message: String },
    /// An event stream, one `result` envelope per frame.
    Events(Vec<Value>),
    /// An event stream whose frames carry these envelopes verbatim.
    Frames(Vec<Value>),
    /// Like `Events`, but the connection stays open after the last frame.
    Held(Vec<Value>),
    /// A bare HTTP status with a text body.
    Status(u16, String),
}

impl Reply {
    pub fn error(message: &str) -> Self {
        Reply::Error {
            code: -32603,
            message: message.to_string(),
        }
    }
}

/// Where the agent card is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLocation {
    /// `/.well-known/agent.json`
    AgentJson,
    /// `/.well-known/agent-card.json` only
    AgentCardJson,
}

/// Behaviour of the mock agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub streaming: bool,
    pub card_location: CardLocation,
    pub send: Reply,
    pub stream: Reply,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            streaming: true,
            card_location: CardLocation::AgentJson,
            send: Reply::Result(message_result("reply-1", "Hello, World!")),
            stream: Reply::Events(Vec::new()),
        }
    }
}

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct AppState {
    config: Arc<AgentConfig>,
    log: Arc<Mutex<Vec<Recorded>>>,
    disconnects: mpsc::UnboundedSender<()>,
}

/// Reports when a held event stream is dropped by the server.
struct ConnectionGuard(mpsc::UnboundedSender<()>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}

/// A running mock agent bound to `127.0.0.1:0`.
pub struct MockAgent {
    pub base_url: String,
    log: Arc<Mutex<Vec<Recorded>>>,
    disconnects: tokio::sync::Mutex<mpsc::UnboundedReceiver<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for MockAgent {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockAgent {
    pub async fn start(config: AgentConfig) -> Self {
        init_tracing();

        let (disconnects_tx, disconnects_rx) = mpsc::unbounded_channel();
        let state = AppState {
            config: Arc::new(config),
            log: Arc::new(Mutex::new(Vec::new())),
            disconnects: disconnects_tx,
        };
        let log = Arc::clone(&state.log);

        let app = Router::new()
            .route("/.well-known/agent.json", get(agent_json))
            .route("/.well-known/agent-card.json", get(agent_card_json))
            .route("/", post(json_rpc))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            log,
            disconnects: tokio::sync::Mutex::new(disconnects_rx),
            handle,
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// JSON-RPC methods received, in order.
    pub fn methods(&self) -> Vec<String> {
        self.recorded()
            .iter()
            .filter_map(|r| r.body.as_ref())
            .filter_map(|b| b["method"].as_str().map(str::to_string))
            .collect()
    }

    /// JSON-RPC request bodies received, in order.
    pub fn rpc_bodies(&self) -> Vec<Value> {
        self.recorded().into_iter().filter_map(|r| r.body).collect()
    }

    /// Whether a held event stream was closed within `within`.
    pub async fn connection_closed(&self, within: Duration) -> bool {
        let mut disconnects = self.disconnects.lock().await;
        tokio::time::timeout(within, disconnects.recv()).await.is_ok()
    }

    /// Agent card requests received, including 404s.
    pub fn card_fetches(&self) -> usize {
        self.recorded()
            .iter()
            .filter(|r| r.path.starts_with("/.well-known/"))
            .count()
    }
}

fn card_body(config: &AgentConfig) -> Value {
    json!({
        "name": "Mock Agent",
        "description": "Answers for tests",
        "version": "0.1.0",
        "url": "http://127.0.0.1/",
        "protocolVersion": "0.3.0",
        "capabilities": {"streaming": config.streaming},
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain"],
        "skills": []
    })
}

fn serve_card(state: &AppState, path: &str, headers: HeaderMap, location: CardLocation) -> Response {
    state.log.lock().unwrap().push(Recorded {
        path: path.to_string(),
        headers,
        body: None,
    });
    if state.config.card_location == location {
        Json(card_body(&state.config)).into_response()
    } else {
        (StatusCode::NOT_FOUND, "no card here").into_response()
    }
}

async fn agent_json(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_card(&state, "/.well-known/agent.json", headers, CardLocation::AgentJson)
}

async fn agent_card_json(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_card(
        &state,
        "/.well-known/agent-card.json",
        headers,
        CardLocation::AgentCardJson,
    )
}

async fn json_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let id = body["id"].clone();
    let reply = match body["method"].as_str() {
        Some("message/stream") => state.config.stream.clone(),
        _ => state.config.send.clone(),
    };
    state.log.lock().unwrap().push(Recorded {
        path: "/".to_string(),
        headers,
        body: Some(body),
    });

    match reply {
        Reply::Result(result) => Json(json!({"jsonrpc": "2.0", "id": id, "result": result})).into_response(),
        Reply::Error { code, message } => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message}
        }))
        .into_response(),
        Reply::Events(results) => sse(envelopes(&id, results)),
        Reply::Frames(frames) => sse(frames),
        Reply::Held(results) => {
            held_sse(envelopes(&id, results), ConnectionGuard(state.disconnects.clone()))
        }
        Reply::Status(status, text) => {
            (StatusCode::from_u16(status).unwrap(), text).into_response()
        }
    }
}

fn envelopes(id: &Value, results: Vec<Value>) -> Vec<Value> {
    results
        .into_iter()
        .map(|result| json!({"jsonrpc": "2.0", "id": id.clone(), "result": result}))
        .collect()
}

fn sse(frames: Vec<Value>) -> Response {
    let events = stream::iter(
        frames
            .into_iter()
            .map(|frame| Ok::<_, Infallible>(Event::default().data(frame.to_string()))),
    );
    Sse::new(events).into_response()
}

/// Sends `frames`, then keeps the connection open with keep-alive comments
/// until the client goes away.
fn held_sse(frames: Vec<Value>, guard: ConnectionGuard) -> Response {
    let events = async_stream::stream! {
        let _guard = guard;
        for frame in frames {
            yield Ok::<_, Infallible>(Event::default().data(frame.to_string()));
        }
        futures::future::pending::<()>().await;
    };
    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(Duration::from_millis(50)))
        .into_response()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Result builders
// ---------------------------------------------------------------------------

pub fn message_result(id: &str, text: &str) -> Value {
    json!({
        "kind": "message",
        "messageId": id,
        "contextId": "ctx-1",
        "role": "agent",
        "parts": [{"kind": "text", "text": text}]
    })
}

pub fn task(id: &str, state: &str) -> Value {
    json!({
        "kind": "task",
        "id": id,
        "contextId": "ctx-1",
        "status": {"state": state, "timestamp": "2025-05-07T12:00:00Z"}
    })
}

pub fn artifact_update(artifact_id: &str, text: &str, append: bool, last_chunk: bool) -> Value {
    json!({
        "kind": "artifact-update",
        "taskId": "task-1",
        "contextId": "ctx-1",
        "artifact": {"artifactId": artifact_id, "parts": [{"kind": "text", "text": text}]},
        "append": append,
        "lastChunk": last_chunk
    })
}

pub fn status_update(state: &str, is_final: bool) -> Value {
    json!({
        "kind": "status-update",
        "taskId": "task-1",
        "contextId": "ctx-1",
        "status": {"state": state},
        "final": is_final
    })
}

/// Drain a part stream, stopping at the first error.
pub async fn collect(
    mut stream: BoxStream<'static, Result<StreamPart, A2AError>>,
) -> (Vec<StreamPart>, Option<A2AError>) {
    let mut parts = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(part) => parts.push(part),
            Err(err) => {
                assert!(stream.next().await.is_none(), "items after an error");
                return (parts, Some(err));
            }
        }
    }
    (parts, None)
}

/// The `type` tag of every part.
pub fn part_types(parts: &[StreamPart]) -> Vec<String> {
    parts
        .iter()
        .map(|p| serde_json::to_value(p).unwrap()["type"].as_str().unwrap().to_string())
        .collect()
}
