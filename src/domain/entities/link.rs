//! Arguments to the host's navigation link builders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named identifier fields of an options-style link builder call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOptions {
    #[serde(
        default,
        deserialize_with = "super::message::id_string::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub guild_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "super::message::id_string::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "super::message::id_string::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "super::message::id_string::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,

    /// Every other key of the caller's options, handed on untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The call shapes a link builder accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkBuilderArgs {
    /// `(guild, channel, message)`
    Positional {
        guild_id: String,
        channel_id: String,
        message_id: String,
    },
    /// A single options record
    Options(LinkOptions),
    /// Any other call; never rewritten
    Other(Vec<Value>),
}

impl LinkBuilderArgs {
    /// Classify raw call arguments.
    pub fn from_values(args: Vec<Value>) -> Self {
        fn id(value: &Value) -> Option<String> {
            match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        }

        match args.as_slice() {
            [guild, channel, message] => match (id(guild), id(channel), id(message)) {
                (Some(guild_id), Some(channel_id), Some(message_id)) => Self::Positional {
                    guild_id,
                    channel_id,
                    message_id,
                },
                _ => Self::Other(args),
            },
            [Value::Object(_)] => match serde_json::from_value(args[0].clone()) {
                Ok(options) => Self::Options(options),
                Err(_) => Self::Other(args),
            },
            _ => Self::Other(args),
        }
    }

    /// The raw call arguments, in the shape they were classified from.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Positional {
                guild_id,
                channel_id,
                message_id,
            } => vec![guild_id.into(), channel_id.into(), message_id.into()],
            Self::Options(options) => {
                vec![serde_json::to_value(options).unwrap_or_else(|_| Value::Object(Map::new()))]
            }
            Self::Other(args) => args,
        }
    }
}
