//! Conversion between the caller's conversation and A2A wire messages.

use crate::error::{A2AError, A2AResult};
use crate::prompt::{Content, ContentPart, ConversationTurn, PromptRole};
use crate::types::{Message, Part, Role, SendMessageResponse};

/// Convert a conversation into wire messages, one per retained turn.
///
/// System and tool turns are dropped. `assistant` becomes `agent`. Every
/// message gets a fresh id from `generate_id`. A file part anywhere fails
/// the whole conversion with [`A2AError::UnsupportedContent`].
pub fn to_wire_messages(
    turns: &[ConversationTurn],
    generate_id: &dyn Fn() -> String,
) -> A2AResult<Vec<Message>> {
    turns
        .iter()
        .filter_map(|turn| wire_role(turn.role).map(|role| (role, turn)))
        .map(|(role, turn)| {
            let parts = turn
                .content
                .iter()
                .map(to_wire_part)
                .collect::<A2AResult<Vec<_>>>()?;
            Ok(Message::new(generate_id(), role, parts))
        })
        .collect()
}

fn wire_role(role: PromptRole) -> Option<Role> {
    match role {
        PromptRole::User => Some(Role::User),
        PromptRole::Assistant => Some(Role::Agent),
        PromptRole::System | PromptRole::Tool => None,
    }
}

fn to_wire_part(part: &ContentPart) -> A2AResult<Part> {
    match part {
        ContentPart::Text { text } => Ok(Part::text(text.clone())),
        ContentPart::File { .. } => Err(A2AError::file_unsupported()),
    }
}

/// Project one inbound part to output content. Only text survives.
pub fn part_to_content(part: &Part) -> Option<Content> {
    match part {
        Part::Text { text, .. } => Some(Content::text(text.clone())),
        other => {
            tracing::warn!("dropping inbound '{}' part; only text is supported", other.kind());
            None
        }
    }
}

/// Flatten a `message/send` result into ordered text content.
///
/// A message contributes its parts. A task contributes its status message
/// parts, then each artifact's parts in artifact order. History is ignored.
pub fn response_to_content(response: &SendMessageResponse) -> Vec<Content> {
    match response {
        SendMessageResponse::Message(message) => {
            message.parts.iter().filter_map(part_to_content).collect()
        }
        SendMessageResponse::Task(task) => {
            let status_parts = task
                .status
                .message
                .iter()
                .flat_map(|message| message.parts.iter());
            let artifact_parts = task
                .artifacts
                .iter()
                .flatten()
                .flat_map(|artifact| artifact.parts.iter());
            status_parts
                .chain(artifact_parts)
                .filter_map(part_to_content)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn counter() -> impl Fn() -> String {
        let next = Cell::new(0);
        move || {
            next.set(next.get() + 1);
            format!("id-{}", next.get())
        }
    }

    #[test]
    fn keeps_order_and_maps_roles() {
        let turns = vec![
            ConversationTurn::system("be brief"),
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello"),
            ConversationTurn::new(PromptRole::Tool, vec![ContentPart::text("42")]),
            ConversationTurn::user("tell me a joke"),
        ];
        let messages = to_wire_messages(&turns, &counter()).unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages.iter().map(|m| m.role).collect::<Vec<_>>(),
            vec![Role::User, Role::Agent, Role::User]
        );
        assert_eq!(
            messages.iter().map(|m| m.message_id.as_str()).collect::<Vec<_>>(),
            vec!["id-1", "id-2", "id-3"]
        );
        assert_eq!(messages[2].parts, vec![Part::text("tell me a joke")]);
        assert!(messages.iter().all(|m| m.context_id.is_none()));
    }

    #[test]
    fn file_part_fails_whole_conversion() {
        let turns = vec![
            ConversationTurn::user("first"),
            ConversationTurn::new(
                PromptRole::User,
                vec![ContentPart::text("see attached"), ContentPart::file(vec![1, 2, 3], "image/png")],
            ),
        ];
        match to_wire_messages(&turns, &counter()).unwrap_err() {
            A2AError::UnsupportedContent { functionality, .. } => {
                assert_eq!(functionality, "file upload/download");
            }
            other => panic!("wrong error: {other:?}"),
        }
    }

    #[test]
    fn file_part_in_dropped_turn_is_ignored() {
        let turns = vec![
            ConversationTurn::new(PromptRole::System, vec![ContentPart::file(vec![0], "text/plain")]),
            ConversationTurn::user("hi"),
        ];
        assert_eq!(to_wire_messages(&turns, &counter()).unwrap().len(), 1);
    }

    #[test]
    fn message_result_becomes_text_content() {
        let response: SendMessageResponse = serde_json::from_value(json!({
            "kind": "message",
            "messageId": "363422be",
            "contextId": "c295ea44",
            "role": "agent",
            "parts": [{"kind": "text", "text": "Hello, World!"}]
        }))
        .unwrap();
        assert_eq!(response_to_content(&response), vec![Content::text("Hello, World!")]);
    }

    #[test]
    fn task_result_walks_status_then_artifacts() {
        let response: SendMessageResponse = serde_json::from_value(json!({
            "kind": "task",
            "id": "t1",
            "contextId": "c1",
            "status": {
                "state": "completed",
                "message": {
                    "kind": "message", "messageId": "s1", "role": "agent",
                    "parts": [{"kind": "text", "text": "status"}]
                }
            },
            "artifacts": [
                {"artifactId": "a1", "parts": [{"kind": "text", "text": "first"}]},
                {"artifactId": "a2", "parts": [
                    {"kind": "file", "file": {"bytes": "R0lGOD", "mimeType": "image/png"}},
                    {"kind": "text", "text": "second"}
                ]}
            ],
            "history": [
                {"kind": "message", "messageId": "h1", "role": "user",
                 "parts": [{"kind": "text", "text": "ignored"}]}
            ]
        }))
        .unwrap();
        assert_eq!(
            response_to_content(&response),
            vec![Content::text("status"), Content::text("first"), Content::text("second")]
        );
    }
}
