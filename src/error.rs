//! Error types for the A2A provider.
//!
//! Every failure terminates the current exchange. Nothing in this crate
//! retries: transport and protocol failures are handed to the caller as-is.

use crate::types::JsonRpcError;

// ---------------------------------------------------------------------------
// JSON-RPC error codes used locally
// ---------------------------------------------------------------------------

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// The agent returned an invalid response.
pub const INVALID_AGENT_RESPONSE: i64 = -32006;

/// The content type is not supported.
pub const CONTENT_TYPE_NOT_SUPPORTED: i64 = -32005;

/// Functionality label used when a file-typed part is sent or received.
pub const FILE_FUNCTIONALITY: &str = "file upload/download";

// ---------------------------------------------------------------------------
// A2AError enum
// ---------------------------------------------------------------------------

/// Unified error type for the provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum A2AError {
    /// A content part or call option this provider refuses to handle
    /// (file parts, tool definitions). Raised before any network I/O.
    #[error("Unsupported functionality '{functionality}': {message}")]
    UnsupportedContent {
        /// What was requested, e.g. `"tools"` or `"file upload/download"`.
        functionality: String,
        /// Human-readable error message.
        message: String,
    },

    /// A JSON-RPC `error` envelope was received from the remote agent.
    #[error("Error sending message: {message} (JSON-RPC error {code})")]
    Protocol {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the agent.
        message: String,
        /// Optional structured error data.
        data: Option<serde_json::Value>,
    },

    /// Network failure reaching the agent or while consuming a stream.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status with the response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// A body or frame that is not JSON, or not a JSON-RPC envelope.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// An event whose `kind` is not one of the four known variants, or whose
    /// payload does not match its declared kind.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// No user or assistant turn survived prompt filtering.
    #[error("Cannot handle zero messages")]
    EmptyPrompt,
}

/// Convenience result type for provider operations.
pub type A2AResult<T> = Result<T, A2AError>;

impl A2AError {
    /// Create an `UnsupportedContent` error.
    pub fn unsupported(functionality: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedContent {
            functionality: functionality.into(),
            message: message.into(),
        }
    }

    /// The error raised for any file-typed part.
    pub fn file_unsupported() -> Self {
        Self::unsupported(
            FILE_FUNCTIONALITY,
            "File upload and download functionality has been removed.",
        )
    }

    /// The error raised when call options carry tool definitions.
    pub fn tools_unsupported() -> Self {
        Self::unsupported("tools", "We don't support tools, yet.")
    }

    /// Returns `true` for network and HTTP status failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, A2AError::Transport(_) | A2AError::Http { .. })
    }

    /// Returns `true` for JSON-RPC error envelopes.
    pub fn is_protocol(&self) -> bool {
        matches!(self, A2AError::Protocol { .. })
    }

    /// Returns the JSON-RPC error code associated with this error.
    ///
    /// Protocol errors keep the agent's code; local failures map to the
    /// closest A2A code.
    pub fn code(&self) -> i64 {
        match self {
            A2AError::Protocol { code, .. } => *code,
            A2AError::UnsupportedContent { .. } => CONTENT_TYPE_NOT_SUPPORTED,
            A2AError::MalformedEvent(_) | A2AError::InvalidJson(_) => INVALID_AGENT_RESPONSE,
            A2AError::Transport(_) | A2AError::Http { .. } | A2AError::EmptyPrompt => {
                INTERNAL_ERROR
            }
        }
    }
}

impl From<JsonRpcError> for A2AError {
    fn from(err: JsonRpcError) -> Self {
        A2AError::Protocol {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

impl From<reqwest::Error> for A2AError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            A2AError::Transport(format!("connection failed: {err}"))
        } else if err.is_timeout() {
            A2AError::Transport(format!("request timed out: {err}"))
        } else {
            A2AError::Transport(format!("HTTP request failed: {err}"))
        }
    }
}
