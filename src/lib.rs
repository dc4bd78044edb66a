//! # a2a-provider — chat language model backed by A2A agents
//!
//! This crate lets code written against a "chat with a language model"
//! streaming interface talk to a remote agent that speaks the
//! [A2A protocol](https://a2a-protocol.org/latest/specification/) v0.3
//! (JSON-RPC 2.0 plus Server-Sent Events).
//!
//! The agent's base URL is the model id. A conversation goes out as an A2A
//! message; tasks, messages, status updates and artifact updates come back
//! and are turned into text content or a typed part stream
//! (`stream-start`, `response-metadata`, `text-start` / `text-delta` /
//! `text-end`, `finish`).
//!
//! ## Quick Start
//!
//! ```no_run
//! use a2a_provider::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = A2aProvider::new(ProviderSettings::default())?;
//!     let model = provider.language_model("http://localhost:41241");
//!
//!     // Single-shot
//!     let result = model
//!         .generate(CallOptions::new(vec![ConversationTurn::user("Hello")]))
//!         .await?;
//!     println!("{:?}", result.content);
//!
//!     // Streaming, continuing an earlier exchange
//!     let options = CallOptions::new(vec![ConversationTurn::user("Tell me a story")])
//!         .with_context_id("c295ea44");
//!     let mut stream = model.stream(options).await?.stream;
//!     while let Some(part) = stream.next().await {
//!         if let StreamPart::TextDelta { delta, .. } = part? {
//!             print!("{delta}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## What is not supported
//!
//! - Tools: any tool definition fails the call with
//!   [`A2AError::UnsupportedContent`] before a request is made.
//! - Files: file parts in the conversation fail the same way; file and data
//!   parts sent back by the agent are dropped.
//! - Token usage: agents do not report it, so [`prompt::Usage`] stays unset.
//!
//! ## Architecture
//!
//! - [`provider::A2aProvider`]: builds models, owns HTTP settings and the
//!   capabilities cache
//! - [`model::A2aChatLanguageModel`]: `generate` and `stream`
//! - [`client::AgentClient`]: JSON-RPC send, SSE subscription, discovery
//! - [`stream_transformer::StreamTransformer`]: per-exchange event translation
//! - [`text_blocks::TextBlocks`]: text-block start/delta/end bookkeeping
//! - [`finish_reason::map_finish_reason`]: task state to finish reason
//! - [`convert`]: conversation to wire messages, results to content
//! - [`normalize`]: event kind dispatch and response metadata

pub mod client;
pub mod convert;
pub mod error;
pub mod finish_reason;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod stream_transformer;
pub mod text_blocks;
pub mod types;

/// Prelude module that re-exports commonly used types.
///
/// ```
/// use a2a_provider::prelude::*;
///
/// let options = CallOptions::new(vec![ConversationTurn::user("hi")]);
/// assert!(options.tools.is_none());
/// ```
pub mod prelude {
    pub use crate::client::{AgentClient, CapabilitiesCache, CardResolver};
    pub use crate::error::{A2AError, A2AResult};
    pub use crate::finish_reason::FinishReason;
    pub use crate::model::A2aChatLanguageModel;
    pub use crate::prompt::{
        CallOptions, CallWarning, Content, ContentPart, ConversationTurn, GenerateResult,
        PromptRole, RequestBody, ResponseMetadata, StreamPart, StreamResult, ToolDefinition,
        Usage,
    };
    pub use crate::provider::{A2aProvider, ProviderSettings};
    pub use crate::types::{
        AgentCard, Message, Part, Role, SendMessageResponse, StreamResponse, Task, TaskState,
    };
}

pub use error::{A2AError, A2AResult};
pub use model::A2aChatLanguageModel;
pub use provider::{A2aProvider, ProviderSettings};
