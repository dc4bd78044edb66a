//! Event normalization: kind classification, frame decoding and response
//! metadata extraction.
//!
//! The agent's results are dispatched on a closed set of four kinds. An
//! unrecognized kind is a [`A2AError::MalformedEvent`], never a silent skip,
//! so protocol drift surfaces at the first unexpected frame.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{A2AError, A2AResult};
use crate::prompt::ResponseMetadata;
use crate::types::{JsonRpcResponse, StreamResponse};

/// The four kinds of result object an agent may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `"task"`
    Task,
    /// `"message"`
    Message,
    /// `"status-update"`
    StatusUpdate,
    /// `"artifact-update"`
    ArtifactUpdate,
}

impl EventKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Task => "task",
            EventKind::Message => "message",
            EventKind::StatusUpdate => "status-update",
            EventKind::ArtifactUpdate => "artifact-update",
        }
    }

    /// Parse a wire name.
    pub fn parse(kind: &str) -> A2AResult<Self> {
        match kind {
            "task" => Ok(EventKind::Task),
            "message" => Ok(EventKind::Message),
            "status-update" => Ok(EventKind::StatusUpdate),
            "artifact-update" => Ok(EventKind::ArtifactUpdate),
            other => Err(A2AError::MalformedEvent(format!(
                "unknown kind '{other}'; expected one of: task, message, status-update, artifact-update"
            ))),
        }
    }

    /// Classify a raw result object by its `kind` member.
    pub fn of(value: &Value) -> A2AResult<Self> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| A2AError::MalformedEvent("missing 'kind' field".to_string()))?;
        Self::parse(kind)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode one raw result object into a [`StreamResponse`].
pub fn decode_event(value: Value) -> A2AResult<StreamResponse> {
    let kind = match EventKind::of(&value) {
        Ok(kind) => kind,
        Err(e) => {
            tracing::warn!("rejecting agent event: {e}");
            return Err(e);
        }
    };
    serde_json::from_value(value)
        .map_err(|e| A2AError::MalformedEvent(format!("invalid '{kind}' event: {e}")))
}

/// Unwrap a JSON-RPC response envelope into its result object.
///
/// An `error` member becomes [`A2AError::Protocol`] carrying the agent's
/// message.
pub fn unwrap_envelope(response: JsonRpcResponse) -> A2AResult<Value> {
    if let Some(error) = response.error {
        return Err(error.into());
    }
    response.result.ok_or_else(|| {
        A2AError::InvalidJson("JSON-RPC response has neither 'result' nor 'error'".to_string())
    })
}

/// Decode the data of one SSE frame.
///
/// Frames normally carry a JSON-RPC response envelope. Agents that send the
/// bare result object are accepted too.
pub fn decode_frame(data: &str) -> A2AResult<StreamResponse> {
    let value: Value = serde_json::from_str(data).map_err(|e| {
        A2AError::InvalidJson(format!("failed to parse SSE event data: {e} (data: {data})"))
    })?;

    let event_value = if value.get("jsonrpc").is_some() {
        let envelope: JsonRpcResponse = serde_json::from_value(value)
            .map_err(|e| A2AError::InvalidJson(format!("invalid JSON-RPC envelope: {e}")))?;
        unwrap_envelope(envelope)?
    } else {
        value
    };

    decode_event(event_value)
}

/// Extract response metadata (identifier and timestamp) from a result.
///
/// | kind | id | timestamp |
/// |---|---|---|
/// | task | task id | status timestamp |
/// | message | message id | none |
/// | status-update | task id | status timestamp |
/// | artifact-update | task id | none |
pub fn response_metadata(event: &StreamResponse) -> ResponseMetadata {
    let (id, timestamp) = match event {
        StreamResponse::Task(task) => (&task.id, task.status.timestamp.as_deref()),
        StreamResponse::Message(message) => (&message.message_id, None),
        StreamResponse::StatusUpdate(update) => (&update.task_id, update.status.timestamp.as_deref()),
        StreamResponse::ArtifactUpdate(update) => (&update.task_id, None),
    };

    ResponseMetadata {
        id: Some(id.clone()),
        model_id: None,
        timestamp: timestamp.and_then(parse_timestamp),
    }
}

/// Parse an A2A timestamp. RFC 3339 is expected; offset-less ISO-8601 is
/// read as UTC. Anything else is logged and dropped.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    tracing::warn!("ignoring unparsable status timestamp '{raw}'");
    None
}
