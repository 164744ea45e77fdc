//! Message records as they travel through the client dispatch bus.
//!
//! Records are Discord-shaped JSON objects owned by the host. Only the fields
//! this crate reads or rewrites are typed; everything else is carried in
//! `extra` so a rewrite never drops host data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// JSON key of the hidden overlay marker on synthesized records.
pub const OVERLAY_MARKER_KEY: &str = "__exact_timestamp";

/// Identifier fields arrive as strings or bare numbers depending on the
/// producer. Both are coerced to the decimal string form.
pub(crate) mod id_string {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(coerce(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(coerce(Value::deserialize(deserializer)?))
    }

    fn coerce(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Decode a field, falling back to its default when the host sent a shape
/// the typed model does not expect (a `null` flag, a number where text was
/// expected). One odd field must not stop the rest of a record from being
/// rewritten.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A message as dispatched by the host or produced by the synthesizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(
        default,
        deserialize_with = "id_string::deserialize",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,

    /// Discord message type (0 for a regular message)
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<u8>,

    /// Visible text. Never carries overlay data.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(
        default,
        deserialize_with = "id_string::deserialize",
        skip_serializing_if = "String::is_empty"
    )]
    pub channel_id: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRecord>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<MentionRecord>>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mention_roles: Option<Vec<Value>>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mention_everyone: Option<bool>,

    /// Reply reference
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<EmbedRecord>>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub edited_timestamp: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,

    /// Authoritative display instant for synthesized records, read only by
    /// the render overlay.
    #[serde(
        rename = "__exact_timestamp",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub overlay_timestamp: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageRecord {
    /// Check if this record was produced by the synthesizer.
    pub fn is_synthetic(&self) -> bool {
        self.overlay_timestamp.is_some()
    }

    /// Visible text, empty when absent.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Message author.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthorRecord {
    #[serde(
        default,
        deserialize_with = "id_string::deserialize",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub username: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,

    /// Legacy four-digit tag
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub discriminator: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Unset and `false` are the same to the host, so `false` is not written
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "std::ops::Not::not")]
    pub bot: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user mentioned in a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MentionRecord {
    #[serde(
        default,
        deserialize_with = "id_string::deserialize",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reply reference pointing at another message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageReference {
    #[serde(
        default,
        deserialize_with = "id_string::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub guild_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "id_string::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "id_string::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rich embed attached to a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmbedRecord {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "String::is_empty")]
    pub url: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Embed fields as supplied by a caller or a configuration entry.
///
/// Blank strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedSpec {
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail: String,
}

impl EmbedSpec {
    pub fn is_empty(&self) -> bool {
        [&self.title, &self.description, &self.url, &self.thumbnail]
            .iter()
            .all(|field| field.trim().is_empty())
    }

    /// Build a rich embed, or `None` when every field is blank.
    pub fn to_record(&self) -> Option<EmbedRecord> {
        if self.is_empty() {
            return None;
        }

        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());

        Some(EmbedRecord {
            kind: Some("rich".into()),
            title: non_blank(&self.title),
            description: non_blank(&self.description),
            url: non_blank(&self.url),
            thumbnail: non_blank(&self.thumbnail).map(|url| EmbedThumbnail {
                url,
                extra: Map::new(),
            }),
            extra: Map::new(),
        })
    }
}

/// Which mention kinds an outbound message may ping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

impl Default for AllowedMentions {
    fn default() -> Self {
        Self {
            parse: vec!["users".into(), "roles".into(), "everyone".into()],
        }
    }
}

/// Payload handed to the host's real send entry point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: String,

    #[serde(rename = "invalidEmojis", default)]
    pub invalid_emojis: Vec<String>,

    #[serde(default)]
    pub tts: bool,

    #[serde(default)]
    pub allowed_mentions: AllowedMentions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedRecord>,
}
