//! Server-Sent Events subscription for `message/stream`.
//!
//! Each SSE frame carries one JSON-RPC response envelope whose `result` is
//! a task, message, status update or artifact update. Frames are decoded
//! independently as they are pulled; nothing is read ahead.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Error as EventSourceError, Event, EventSource};

use crate::error::{A2AError, A2AResult};
use crate::normalize::{decode_event, decode_frame, unwrap_envelope};
use crate::types::{JsonRpcResponse, StreamResponse};

/// A lazy, non-restartable sequence of agent results.
pub type EventStream = BoxStream<'static, A2AResult<StreamResponse>>;

/// A stream of decoded A2A server-sent events.
///
/// The connection is opened on the first poll and released when the stream
/// ends, fails, or is dropped. A `final` status update ends the stream even
/// if the agent keeps the connection open. A failed frame is yielded as an
/// error and ends the stream. Reconnection is disabled.
///
/// # Example
///
/// ```no_run
/// # use futures::StreamExt;
/// # async fn example(mut stream: a2a_provider::client::SseStream) {
/// while let Some(event) = stream.next().await {
///     match event {
///         Ok(response) => println!("Got event: {:?}", response),
///         Err(e) => eprintln!("Stream error: {}", e),
///     }
/// }
/// # }
/// ```
pub struct SseStream {
    inner: EventStream,
}

impl std::fmt::Debug for SseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseStream").finish_non_exhaustive()
    }
}

impl SseStream {
    /// Subscribe to the event stream produced by `request`.
    pub fn subscribe(request: reqwest::RequestBuilder) -> A2AResult<Self> {
        let mut source = EventSource::new(request)
            .map_err(|e| A2AError::Transport(format!("cannot open event stream: {e}")))?;
        source.set_retry_policy(Box::new(Never));

        let inner = async_stream::stream! {
            while let Some(event) = source.next().await {
                match event {
                    Ok(Event::Open) => tracing::debug!("event stream opened"),
                    Ok(Event::Message(message)) => {
                        tracing::trace!(data = %message.data, "received SSE frame");
                        let decoded = decode_frame(&message.data);
                        let last = match &decoded {
                            Ok(event) => event.is_final(),
                            Err(_) => true,
                        };
                        yield decoded;
                        if last {
                            break;
                        }
                    }
                    Err(EventSourceError::StreamEnded) => {
                        tracing::debug!("event stream closed by agent");
                        break;
                    }
                    Err(EventSourceError::InvalidContentType(_, response)) => {
                        // Agents may answer message/stream with a plain JSON-RPC body.
                        yield decode_json_answer(response).await;
                        break;
                    }
                    Err(err) => {
                        yield Err(stream_error(err).await);
                        break;
                    }
                }
            }
            source.close();
        };

        Ok(Self {
            inner: Box::pin(inner),
        })
    }
}

impl Stream for SseStream {
    type Item = A2AResult<StreamResponse>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

async fn decode_json_answer(response: reqwest::Response) -> A2AResult<StreamResponse> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| A2AError::Transport(format!("failed to read response body: {e}")))?;
    let envelope: JsonRpcResponse = serde_json::from_slice(&bytes)
        .map_err(|e| A2AError::InvalidJson(format!("failed to parse JSON-RPC response: {e}")))?;
    decode_event(unwrap_envelope(envelope)?)
}

async fn stream_error(err: EventSourceError) -> A2AError {
    match err {
        EventSourceError::InvalidStatusCode(status, response) => A2AError::Http {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        },
        EventSourceError::Transport(e) => A2AError::Transport(format!("error reading SSE stream: {e}")),
        other => A2AError::Transport(format!("error reading SSE stream: {other}")),
    }
}
