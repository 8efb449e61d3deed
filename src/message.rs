//! Chat message data structures.

use serde::{Deserialize, Serialize};

/// Follow-up action carried by a synthesized assistant message.
///
/// Action messages used to be recognized by their display text; modeling
/// them as a tagged variant keeps the affordance independent of wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAction {
    /// An ordinary display-only message.
    #[default]
    None,
    /// Activating this message re-issues the failed chat request.
    Retry,
    /// Activating this message navigates to the settings surface.
    OpenSettings,
}

/// A single entry in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for the message
    pub id: String,
    /// Message text
    pub text: String,
    /// True for user-authored messages, false for assistant-authored
    pub is_user: bool,
    /// Optional interactive follow-up carried by the message
    #[serde(default, skip_serializing_if = "MessageAction::is_none")]
    pub action: MessageAction,
}

impl MessageAction {
    fn is_none(&self) -> bool {
        matches!(self, MessageAction::None)
    }
}

impl Message {
    /// Creates a user-authored message.
    pub fn user(id: String, text: String) -> Self {
        Message {
            id,
            text,
            is_user: true,
            action: MessageAction::None,
        }
    }

    /// Creates an assistant-authored display message.
    pub fn assistant(id: String, text: String) -> Self {
        Message {
            id,
            text,
            is_user: false,
            action: MessageAction::None,
        }
    }

    /// Creates a synthesized assistant message carrying an action.
    pub fn affordance(id: String, text: String, action: MessageAction) -> Self {
        Message {
            id,
            text,
            is_user: false,
            action,
        }
    }

    /// Whether this message is part of the conversation proper, as opposed
    /// to a synthesized affordance.
    pub fn is_plain(&self) -> bool {
        matches!(self.action, MessageAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_omits_action_field() {
        let msg = Message::user("1".into(), "hello".into());
        let json = serde_json::to_string(&msg).expect("message should serialize");
        assert!(!json.contains("action"));
    }

    #[test]
    fn action_survives_round_trip_and_defaults_when_absent() {
        let msg = Message::affordance("2".into(), "Retry".into(), MessageAction::Retry);
        let json = serde_json::to_string(&msg).expect("message should serialize");
        let back: Message = serde_json::from_str(&json).expect("message should deserialize");
        assert_eq!(back.action, MessageAction::Retry);
        assert!(!back.is_plain());

        let legacy: Message =
            serde_json::from_str(r#"{"id":"3","text":"hi","is_user":false}"#)
                .expect("legacy message should deserialize");
        assert_eq!(legacy.action, MessageAction::None);
    }
}
