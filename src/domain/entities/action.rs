//! Dispatch actions delivered over the client event bus.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::MessageRecord;

/// Action types this crate recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    /// A new message arrived (or was received locally)
    MessageCreate,
    /// An existing message was edited
    MessageUpdate,
    /// A page of channel history was loaded
    LoadMessagesSuccess,
    /// Anything else; passed through untouched
    Other,
}

impl From<&str> for ActionType {
    fn from(s: &str) -> Self {
        match s {
            "MESSAGE_CREATE" => Self::MessageCreate,
            "MESSAGE_UPDATE" => Self::MessageUpdate,
            "LOAD_MESSAGES_SUCCESS" => Self::LoadMessagesSuccess,
            _ => Self::Other,
        }
    }
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageUpdate => "MESSAGE_UPDATE",
            Self::LoadMessagesSuccess => "LOAD_MESSAGES_SUCCESS",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bus event: a type tag plus an open payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchAction {
    #[serde(rename = "type")]
    pub action_type: String,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl DispatchAction {
    pub fn new(action_type: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
        }
    }

    pub fn kind(&self) -> ActionType {
        ActionType::from(self.action_type.as_str())
    }

    /// `MESSAGE_CREATE` for a locally received record.
    pub fn message_create(channel_id: &str, message: &MessageRecord) -> Result<Self, serde_json::Error> {
        let mut payload = Map::new();
        payload.insert("channelId".into(), Value::String(channel_id.to_string()));
        payload.insert("message".into(), serde_json::to_value(message)?);
        payload.insert("optimistic".into(), Value::Bool(false));
        payload.insert("isPushNotification".into(), Value::Bool(false));

        Ok(Self::new(ActionType::MessageCreate.as_str(), payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_type_from_tag() {
        assert_eq!(ActionType::from("MESSAGE_UPDATE"), ActionType::MessageUpdate);
        assert_eq!(ActionType::from("LOAD_MESSAGES_SUCCESS"), ActionType::LoadMessagesSuccess);
        assert_eq!(ActionType::from("message_create"), ActionType::Other);
    }

    #[test]
    fn test_action_roundtrip_keeps_payload() {
        let input = json!({
            "type": "TYPING_START",
            "channelId": "200",
            "userId": "100"
        });

        let action: DispatchAction = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(action.kind(), ActionType::Other);
        assert_eq!(serde_json::to_value(&action).unwrap(), input);
    }

    #[test]
    fn test_message_create_shape() {
        let record = MessageRecord {
            id: "1".into(),
            channel_id: "200".into(),
            content: Some("hi".into()),
            ..Default::default()
        };

        let action = DispatchAction::message_create("200", &record).unwrap();
        assert_eq!(action.kind(), ActionType::MessageCreate);
        assert_eq!(action.payload["channelId"], "200");
        assert_eq!(action.payload["message"]["content"], "hi");
    }
}
