//! Per-exchange translation of agent events into stream parts.
//!
//! One [`StreamTransformer`] lives for exactly one streaming exchange. It
//! owns the text-block state, remembers the finish reason, and makes sure
//! `response-metadata` is emitted once.
//!
//! ```text
//! Init -> AwaitingFirstEvent -> Streaming -> Flushing -> Done
//!                  \________________\___________________-> Error
//! ```
//!
//! Both terminal paths flush open text blocks; only `Done` emits `finish`.

use crate::finish_reason::{map_finish_reason, FinishReason};
use crate::normalize::response_metadata;
use crate::prompt::{CallWarning, StreamPart};
use crate::text_blocks::TextBlocks;
use crate::types::StreamResponse;

/// Where one exchange is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    /// Nothing emitted yet.
    Init,
    /// `stream-start` emitted, no agent event seen.
    AwaitingFirstEvent,
    /// At least one agent event seen.
    Streaming,
    /// The agent stream ended; closing blocks.
    Flushing,
    /// `finish` emitted.
    Done,
    /// The exchange failed; blocks were flushed, no `finish` follows.
    Error,
}

impl ExchangePhase {
    /// Whether no further part will be produced.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExchangePhase::Done | ExchangePhase::Error)
    }
}

/// Turns the agent events of one exchange into [`StreamPart`]s.
#[derive(Debug)]
pub struct StreamTransformer {
    phase: ExchangePhase,
    blocks: TextBlocks,
    finish_reason: FinishReason,
    include_raw_chunks: bool,
}

impl StreamTransformer {
    /// A fresh transformer. With `include_raw_chunks`, every agent event is
    /// also emitted verbatim as a `raw` part.
    pub fn new(include_raw_chunks: bool) -> Self {
        Self {
            phase: ExchangePhase::Init,
            blocks: TextBlocks::new(),
            finish_reason: FinishReason::Unknown,
            include_raw_chunks,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    /// The finish reason resolved so far.
    pub fn finish_reason(&self) -> FinishReason {
        self.finish_reason
    }

    /// The `stream-start` part.
    pub fn prologue(&mut self, warnings: Vec<CallWarning>) -> StreamPart {
        self.phase = ExchangePhase::AwaitingFirstEvent;
        StreamPart::StreamStart { warnings }
    }

    /// Translate one agent event.
    pub fn on_event(&mut self, event: &StreamResponse) -> Vec<StreamPart> {
        let mut out = Vec::new();
        if self.phase.is_terminal() {
            tracing::warn!(kind = %event.kind(), "ignoring agent event after end of exchange");
            return out;
        }

        tracing::debug!(kind = %event.kind(), "received agent event");

        if self.include_raw_chunks {
            match serde_json::to_value(event) {
                Ok(raw_value) => out.push(StreamPart::Raw { raw_value }),
                Err(err) => tracing::warn!(
                    kind = %event.kind(),
                    error = %err,
                    "cannot serialize agent event; skipping raw part"
                ),
            }
        }

        if self.phase != ExchangePhase::Streaming {
            self.phase = ExchangePhase::Streaming;
            out.push(StreamPart::ResponseMetadata(response_metadata(event)));
        }

        match event {
            StreamResponse::StatusUpdate(update) => {
                if update.r#final {
                    self.finish_reason = map_finish_reason(update.status.state);
                    tracing::debug!(
                        task_id = %update.task_id,
                        state = %update.status.state,
                        finish_reason = %self.finish_reason,
                        "task reached final state"
                    );
                }
            }
            StreamResponse::ArtifactUpdate(update) => {
                self.blocks.observe(
                    &update.artifact.parts,
                    &update.artifact.artifact_id,
                    update.last_chunk.unwrap_or(false),
                    &mut out,
                );
            }
            StreamResponse::Task(task) => {
                if let Some(message) = &task.status.message {
                    self.blocks
                        .observe(&message.parts, &message.message_id, true, &mut out);
                }
                for artifact in task.artifacts.iter().flatten() {
                    self.blocks
                        .observe(&artifact.parts, &artifact.artifact_id, true, &mut out);
                }
                self.finish_reason = FinishReason::Stop;
            }
            StreamResponse::Message(message) => {
                self.blocks
                    .observe(&message.parts, &message.message_id, true, &mut out);
                self.finish_reason = FinishReason::Stop;
            }
        }

        out
    }

    /// Close the exchange after the agent stream ended: remaining
    /// `text-end`s, then `finish`.
    pub fn finish(&mut self) -> Vec<StreamPart> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.phase = ExchangePhase::Flushing;
        let mut out = Vec::new();
        self.blocks.flush(&mut out);
        out.push(StreamPart::finish(self.finish_reason));
        self.phase = ExchangePhase::Done;
        out
    }

    /// Abort the exchange: remaining `text-end`s only.
    pub fn fail(&mut self) -> Vec<StreamPart> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.blocks.flush(&mut out);
        self.phase = ExchangePhase::Error;
        out
    }
}
