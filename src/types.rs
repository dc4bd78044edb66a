//! A2A protocol wire types used by the provider.
//!
//! Covers the subset of the A2A v0.3 JSON-RPC schema the provider speaks:
//! messages and parts, tasks with status and artifacts, the two streaming
//! update events, the agent card, and the JSON-RPC envelopes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::EventKind;

// ============================================================================
// Enums
// ============================================================================

/// The lifecycle state of a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Task has been received but not yet started.
    Submitted,
    /// Task is actively being processed.
    Working,
    /// Task requires additional input from the user.
    InputRequired,
    /// Task requires authentication.
    AuthRequired,
    /// Task completed successfully.
    Completed,
    /// Task failed.
    Failed,
    /// Task was canceled.
    Canceled,
    /// Task was rejected by the agent.
    Rejected,
    /// State the agent could not name.
    Unknown,
}

impl TaskState {
    /// All nine states, in protocol order.
    pub const ALL: [TaskState; 9] = [
        TaskState::Submitted,
        TaskState::Working,
        TaskState::InputRequired,
        TaskState::AuthRequired,
        TaskState::Completed,
        TaskState::Failed,
        TaskState::Canceled,
        TaskState::Rejected,
        TaskState::Unknown,
    ];
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::AuthRequired => "auth-required",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
            TaskState::Rejected => "rejected",
            TaskState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// The role of a message sender on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user / client.
    User,
    /// Message from the agent / server.
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

// ============================================================================
// Core Task Types
// ============================================================================

/// Current status of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// The current state.
    pub state: TaskState,

    /// Optional message associated with this status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// ISO-8601 timestamp of when this status was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A task: a server-tracked, possibly long-running unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: String,

    /// Context identifier (groups related tasks/messages).
    #[serde(default)]
    pub context_id: String,

    /// Discriminator field, always "task".
    #[serde(default = "kind_task")]
    pub kind: String,

    /// Current task status.
    pub status: TaskStatus,

    /// Artifacts produced by the task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<Artifact>>,

    /// Message history for this task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// Message & Parts
// ============================================================================

/// A single message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub message_id: String,

    /// Who sent this message.
    pub role: Role,

    /// Discriminator field, always "message".
    #[serde(default = "kind_message")]
    pub kind: String,

    /// Content parts of the message.
    pub parts: Vec<Part>,

    /// Context this message belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Task this message is associated with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Message {
    /// Create a message with the given parts and no context.
    pub fn new(message_id: impl Into<String>, role: Role, parts: Vec<Part>) -> Self {
        Message {
            message_id: message_id.into(),
            role,
            kind: kind_message(),
            parts,
            context_id: None,
            task_id: None,
            metadata: None,
        }
    }
}

/// File content provided as base64-encoded bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileWithBytes {
    /// Base64-encoded file content.
    pub bytes: String,
    /// MIME type of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Optional file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// File content provided as a URI reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileWithUri {
    /// URI pointing to the file content.
    pub uri: String,
    /// MIME type of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Optional file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// File content, either inline bytes or a URI reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    /// File with inline base64-encoded bytes.
    Bytes(FileWithBytes),
    /// File referenced by URI.
    Uri(FileWithUri),
}

/// A content part within a message or artifact.
///
/// JSON wire format:
/// - Text: `{"kind": "text", "text": "hello"}`
/// - File: `{"kind": "file", "file": {"bytes": "SGVsbG8=", "mimeType": "text/plain"}}`
/// - Data: `{"kind": "data", "data": {"key": "value"}}`
///
/// The provider only ever projects text parts. File and data parts are
/// decoded so they can be recognized and dropped, never forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Part {
    /// A text content part.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A file content part.
    #[serde(rename = "file")]
    File {
        /// The file content (bytes or URI).
        file: FileContent,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A structured data content part.
    #[serde(rename = "data")]
    Data {
        /// Arbitrary structured data.
        data: serde_json::Value,
        /// Optional metadata associated with this part.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    /// The text of a text part, `None` for anything else.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The wire discriminator of this part.
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Text { .. } => "text",
            Part::File { .. } => "file",
            Part::Data { .. } => "data",
        }
    }
}

/// An artifact produced by a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Stable artifact identifier; update events for one artifact share it.
    pub artifact_id: String,

    /// Human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description of the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content parts of the artifact.
    #[serde(default)]
    pub parts: Vec<Part>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// Streaming Events
// ============================================================================

/// Notification that a task's status has changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    /// ID of the task whose status changed.
    pub task_id: String,

    /// Context this task belongs to.
    #[serde(default)]
    pub context_id: String,

    /// Discriminator field, always "status-update".
    #[serde(default = "kind_status_update")]
    pub kind: String,

    /// The new status.
    pub status: TaskStatus,

    /// Whether this is the final event of the exchange.
    ///
    /// The v0.3 proto reserves this field, but the JS and Python SDKs still
    /// send it over JSON-RPC and it is the only end-of-exchange signal the
    /// stream carries. Absent is treated as `false`.
    #[serde(rename = "final", default)]
    pub r#final: bool,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Notification that an artifact has been created or extended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    /// ID of the task that produced the artifact.
    pub task_id: String,

    /// Context this task belongs to.
    #[serde(default)]
    pub context_id: String,

    /// Discriminator field, always "artifact-update".
    #[serde(default = "kind_artifact_update")]
    pub kind: String,

    /// The artifact chunk.
    pub artifact: Artifact,

    /// Whether to append to an existing artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,

    /// Whether this is the last chunk of the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<bool>,

    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

fn kind_task() -> String {
    "task".to_string()
}

fn kind_message() -> String {
    "message".to_string()
}

fn kind_status_update() -> String {
    "status-update".to_string()
}

fn kind_artifact_update() -> String {
    "artifact-update".to_string()
}

/// One result object received from the agent: the `result` of a
/// `message/send` call, or one frame of a `message/stream` subscription.
///
/// Discriminated by the `kind` field:
/// - `"task"` -> Task
/// - `"message"` -> Message
/// - `"status-update"` -> TaskStatusUpdateEvent
/// - `"artifact-update"` -> TaskArtifactUpdateEvent
///
/// Any other kind fails to decode. Serializes flat, without wrapper keys.
#[derive(Debug, Clone)]
pub enum StreamResponse {
    /// A complete task snapshot.
    Task(Task),

    /// A direct message.
    Message(Message),

    /// A task status update event.
    StatusUpdate(TaskStatusUpdateEvent),

    /// An artifact update event.
    ArtifactUpdate(TaskArtifactUpdateEvent),
}

impl StreamResponse {
    /// The kind of this result.
    pub fn kind(&self) -> EventKind {
        match self {
            StreamResponse::Task(_) => EventKind::Task,
            StreamResponse::Message(_) => EventKind::Message,
            StreamResponse::StatusUpdate(_) => EventKind::StatusUpdate,
            StreamResponse::ArtifactUpdate(_) => EventKind::ArtifactUpdate,
        }
    }

    /// Whether this is a `final` status update. No event follows it.
    pub fn is_final(&self) -> bool {
        matches!(self, StreamResponse::StatusUpdate(update) if update.r#final)
    }
}

impl From<SendMessageResponse> for StreamResponse {
    fn from(response: SendMessageResponse) -> Self {
        match response {
            SendMessageResponse::Task(task) => StreamResponse::Task(task),
            SendMessageResponse::Message(message) => StreamResponse::Message(message),
        }
    }
}

impl Serialize for StreamResponse {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StreamResponse::Task(inner) => inner.serialize(serializer),
            StreamResponse::Message(inner) => inner.serialize(serializer),
            StreamResponse::StatusUpdate(inner) => inner.serialize(serializer),
            StreamResponse::ArtifactUpdate(inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StreamResponse {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = EventKind::of(&value).map_err(serde::de::Error::custom)?;

        match kind {
            EventKind::Task => serde_json::from_value(value)
                .map(StreamResponse::Task)
                .map_err(serde::de::Error::custom),
            EventKind::Message => serde_json::from_value(value)
                .map(StreamResponse::Message)
                .map_err(serde::de::Error::custom),
            EventKind::StatusUpdate => serde_json::from_value(value)
                .map(StreamResponse::StatusUpdate)
                .map_err(serde::de::Error::custom),
            EventKind::ArtifactUpdate => serde_json::from_value(value)
                .map(StreamResponse::ArtifactUpdate)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// The `result` of a `message/send` call: a task or a direct message.
#[derive(Debug, Clone)]
pub enum SendMessageResponse {
    /// A task was created/updated.
    Task(Task),

    /// A direct message response.
    Message(Message),
}

impl Serialize for SendMessageResponse {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SendMessageResponse::Task(inner) => inner.serialize(serializer),
            SendMessageResponse::Message(inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SendMessageResponse {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StreamResponse::deserialize(deserializer)? {
            StreamResponse::Task(task) => Ok(SendMessageResponse::Task(task)),
            StreamResponse::Message(msg) => Ok(SendMessageResponse::Message(msg)),
            other => Err(serde::de::Error::custom(format!(
                "unexpected kind '{}' in message/send result; expected task or message",
                other.kind()
            ))),
        }
    }
}

// ============================================================================
// Agent Card
// ============================================================================

/// Self-describing manifest served at the agent's well-known URL.
///
/// Only `capabilities.streaming` drives behavior; every other member is
/// kept as opaque passthrough.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentCard {
    /// Human-readable name.
    pub name: String,

    /// Description of the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Agent version string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Advertised endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Optional capabilities.
    pub capabilities: AgentCapabilities,

    /// Every other card member.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AgentCard {
    /// Whether the agent accepts `message/stream`.
    pub fn supports_streaming(&self) -> bool {
        self.capabilities.streaming.unwrap_or(false)
    }
}

/// Optional capabilities advertised by an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentCapabilities {
    /// Supports SSE streaming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,

    /// Supports push notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,

    /// Keeps a history of state transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_transition_history: Option<bool>,

    /// Every other capability member.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// JSON-RPC Foundation
// ============================================================================

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// String identifier.
    String(String),
    /// Numeric identifier.
    Number(i64),
    /// Null.
    Null,
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "{}", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
            JsonRpcId::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Method name.
    pub method: String,

    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(
        id: impl Into<JsonRpcId>,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response envelope.
///
/// Exactly one of `result` or `error` is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier this response corresponds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Successful result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    #[serde(default)]
    pub code: i64,

    /// Human-readable error message.
    #[serde(default)]
    pub message: String,

    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<String> for JsonRpcId {
    fn from(s: String) -> Self {
        JsonRpcId::String(s)
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        JsonRpcId::String(s.to_string())
    }
}

impl From<i64> for JsonRpcId {
    fn from(n: i64) -> Self {
        JsonRpcId::Number(n)
    }
}

// ============================================================================
// Request Parameter Types
// ============================================================================

/// Parameters for `message/send` and `message/stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageParams {
    /// The message to send.
    pub message: Message,

    /// Optional send configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SendMessageConfiguration>,
}

/// Configuration for a `message/send` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageConfiguration {
    /// MIME types the client can accept as output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_output_modes: Option<Vec<String>>,

    /// Whether the request should block until the task completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
}

impl SendMessageConfiguration {
    /// Blocking, text-only configuration used for single-shot calls.
    pub fn blocking_text() -> Self {
        SendMessageConfiguration {
            accepted_output_modes: Some(vec!["text/plain".to_string()]),
            blocking: Some(true),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
