//! Language-model side of the adapter: the conversation a caller hands in,
//! the call options, and the content and stream parts handed back.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::A2AResult;
use crate::finish_reason::FinishReason;
use crate::types::Message;

// ============================================================================
// Prompt
// ============================================================================

/// Role of a conversation turn as the caller sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// System instructions. Never forwarded to the agent.
    System,
    /// End-user turn.
    User,
    /// Previous model/agent turn.
    Assistant,
    /// Tool result turn. Never forwarded to the agent.
    Tool,
}

/// One content part of a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// Binary file. Rejected by the converter.
    File {
        /// Raw file bytes.
        data: Vec<u8>,
        /// IANA media type.
        #[serde(rename = "mediaType")]
        media_type: String,
        /// Optional file name.
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Create a file part.
    pub fn file(data: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        ContentPart::File {
            data: data.into(),
            media_type: media_type.into(),
            filename: None,
        }
    }
}

/// A role-tagged turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced the turn.
    pub role: PromptRole,
    /// Ordered content parts.
    pub content: Vec<ContentPart>,
}

impl ConversationTurn {
    /// Create a turn from parts.
    pub fn new(role: PromptRole, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    /// A user turn with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(PromptRole::User, vec![ContentPart::text(text)])
    }

    /// An assistant turn with a single text part.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(PromptRole::Assistant, vec![ContentPart::text(text)])
    }

    /// A system turn with a single text part.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(PromptRole::System, vec![ContentPart::text(text)])
    }
}

/// A function tool the caller would like the model to use.
///
/// The adapter never negotiates tools with an agent; any tool in the call
/// options fails the call up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the tool input.
    pub input_schema: Value,
}

/// A2A-specific per-call options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aCallOptions {
    /// Context of a previous exchange to continue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// Provider-keyed per-call options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Options for this provider.
    #[serde(default)]
    pub a2a: A2aCallOptions,
}

/// Options for one `generate` or `stream` call.
///
/// `temperature`, `max_output_tokens` and `stop_sequences` are echoed in the
/// request body verbatim; the agent protocol has no place for them.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// The conversation.
    pub prompt: Vec<ConversationTurn>,
    /// Sampling temperature hint.
    pub temperature: Option<f32>,
    /// Output length hint.
    pub max_output_tokens: Option<u32>,
    /// Stop sequence hint.
    pub stop_sequences: Option<Vec<String>>,
    /// Tools. Must be `None`.
    pub tools: Option<Vec<ToolDefinition>>,
    /// Emit a `raw` stream part for every received agent event.
    pub include_raw_chunks: bool,
    /// Provider-keyed options.
    pub provider_options: ProviderOptions,
}

impl CallOptions {
    /// Options for the given conversation, everything else unset.
    pub fn new(prompt: Vec<ConversationTurn>) -> Self {
        Self {
            prompt,
            ..Self::default()
        }
    }

    /// Continue an earlier exchange.
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.provider_options.a2a.context_id = Some(context_id.into());
        self
    }

    /// Emit raw agent events in the stream.
    pub fn with_raw_chunks(mut self) -> Self {
        self.include_raw_chunks = true;
        self
    }

    /// Attach tool definitions.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Output content of a single-shot call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Content {
    /// Generated text.
    Text {
        /// The text.
        text: String,
    },
}

impl Content {
    /// Create a text content item.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }
}

/// Token usage. The agent protocol reports none, so every counter stays unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: Option<u64>,
    /// Completion tokens.
    pub output_tokens: Option<u64>,
    /// Total tokens.
    pub total_tokens: Option<u64>,
}

/// A warning about a call setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CallWarning {
    /// A setting the provider does not support.
    UnsupportedSetting {
        /// Setting name.
        setting: String,
        /// Optional details.
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    /// Anything else.
    Other {
        /// Warning text.
        message: String,
    },
}

/// Identifier and timestamp of the agent's response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Task id or message id of the first event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Always `None`; agents do not name a model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Status timestamp, when the event carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// The request as the adapter built it, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    /// Agent base URL.
    pub model: String,
    /// Every converted message; only the last one is sent.
    pub messages: Vec<Message>,
    /// Temperature hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Output length hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Stop sequence hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Result of a single-shot call.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Text content in order: message parts, status message parts, artifact parts.
    pub content: Vec<Content>,
    /// Always [`FinishReason::Stop`].
    pub finish_reason: FinishReason,
    /// Always unset.
    pub usage: Usage,
    /// The request as sent.
    pub request: RequestBody,
    /// The raw `result` object of the agent's response.
    pub response: Value,
    /// Call warnings.
    pub warnings: Vec<CallWarning>,
}

/// Result of a streaming call.
///
/// The stream is consumed once. Dropping it closes the agent connection.
pub struct StreamResult {
    /// Stream parts, `stream-start` first. A failure is yielded as the last item.
    pub stream: BoxStream<'static, A2AResult<StreamPart>>,
    /// The request as sent.
    pub request: RequestBody,
}

impl std::fmt::Debug for StreamResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResult")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// One typed event of a streaming call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamPart {
    /// First event of every stream.
    StreamStart {
        /// Call warnings.
        warnings: Vec<CallWarning>,
    },
    /// Metadata of the first agent event. Emitted at most once.
    ResponseMetadata(ResponseMetadata),
    /// A text block opens.
    TextStart {
        /// Block id (artifact id or message id).
        id: String,
    },
    /// Text for an open block.
    TextDelta {
        /// Block id.
        id: String,
        /// Text of one agent event, parts joined by a single space.
        delta: String,
    },
    /// A text block closes.
    TextEnd {
        /// Block id.
        id: String,
    },
    /// An agent event as received.
    Raw {
        /// The event JSON.
        #[serde(rename = "rawValue")]
        raw_value: Value,
    },
    /// Last event of a successful stream.
    Finish {
        /// Why the agent stopped.
        #[serde(rename = "finishReason")]
        finish_reason: FinishReason,
        /// Always unset.
        usage: Usage,
    },
}

impl StreamPart {
    /// Create a `text-start` part.
    pub fn text_start(id: impl Into<String>) -> Self {
        StreamPart::TextStart { id: id.into() }
    }

    /// Create a `text-delta` part.
    pub fn text_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        StreamPart::TextDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    /// Create a `text-end` part.
    pub fn text_end(id: impl Into<String>) -> Self {
        StreamPart::TextEnd { id: id.into() }
    }

    /// Create a `finish` part with unset usage.
    pub fn finish(finish_reason: FinishReason) -> Self {
        StreamPart::Finish {
            finish_reason,
            usage: Usage::default(),
        }
    }
}
