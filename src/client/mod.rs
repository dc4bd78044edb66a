//! Client side of the A2A protocol.
//!
//! - [`AgentClient`]: send a message, or send and subscribe, to one agent
//! - [`CardResolver`] / [`CapabilitiesCache`]: discover agent cards and keep
//!   them per endpoint
//! - [`Transport`] / [`JsonRpcTransport`]: pluggable JSON-RPC transport
//! - [`SseStream`]: decoded server-sent event stream

mod agent_client;
mod card_resolver;
mod sse;
mod transport;

pub(crate) use agent_client::decode_send_result;
pub use agent_client::{AgentClient, METHOD_MESSAGE_SEND, METHOD_MESSAGE_STREAM};
pub use card_resolver::{
    CapabilitiesCache, CardResolver, AGENT_CARD_PATH, FALLBACK_AGENT_CARD_PATH,
};
pub use sse::{EventStream, SseStream};
pub use transport::{JsonRpcTransport, Transport, TransportConfig};
