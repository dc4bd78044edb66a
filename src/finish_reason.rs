//! Mapping from remote task states to finish reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::TaskState;

/// Why the agent stopped producing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// The agent finished (or is waiting for the next exchange).
    Stop,
    /// The task failed, was rejected, or needs authentication.
    Error,
    /// The task was canceled.
    Other,
    /// No final state was observed.
    Unknown,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FinishReason::Stop => "stop",
            FinishReason::Error => "error",
            FinishReason::Other => "other",
            FinishReason::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Map a task state to a finish reason.
///
/// `input-required` and `submitted` map to `stop`: the exchange cannot be
/// held open, so resuming means issuing a new one.
pub fn map_finish_reason(state: TaskState) -> FinishReason {
    match state {
        TaskState::Completed | TaskState::InputRequired | TaskState::Submitted => {
            FinishReason::Stop
        }
        TaskState::AuthRequired | TaskState::Failed | TaskState::Rejected => FinishReason::Error,
        TaskState::Canceled => FinishReason::Other,
        TaskState::Working | TaskState::Unknown => FinishReason::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_is_mapped() {
        let expected = [
            (TaskState::Submitted, FinishReason::Stop),
            (TaskState::Working, FinishReason::Unknown),
            (TaskState::InputRequired, FinishReason::Stop),
            (TaskState::AuthRequired, FinishReason::Error),
            (TaskState::Completed, FinishReason::Stop),
            (TaskState::Failed, FinishReason::Error),
            (TaskState::Canceled, FinishReason::Other),
            (TaskState::Rejected, FinishReason::Error),
            (TaskState::Unknown, FinishReason::Unknown),
        ];
        assert_eq!(expected.len(), TaskState::ALL.len());
        for (state, reason) in expected {
            assert_eq!(map_finish_reason(state), reason, "state {state}");
        }
    }

    #[test]
    fn serializes_as_lowercase() {
        assert_eq!(serde_json::to_string(&FinishReason::Other).unwrap(), "\"other\"");
        assert_eq!(FinishReason::Unknown.to_string(), "unknown");
    }
}
