//! Request DTOs
//!
//! Inputs to the synthesis operations.

use serde::Deserialize;

use crate::config::AutoFakeMessage;
use crate::domain::EmbedSpec;

/// Where a synthesized or sent message goes.
///
/// `channel_id` wins over `dm_user_id`; blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageTarget {
    pub channel_id: Option<String>,
    pub dm_user_id: Option<String>,
}

impl MessageTarget {
    pub fn channel(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            dm_user_id: None,
        }
    }

    pub fn dm(user_id: impl Into<String>) -> Self {
        Self {
            channel_id: None,
            dm_user_id: Some(user_id.into()),
        }
    }

    /// Build from raw configuration strings.
    pub fn from_parts(channel_id: &str, dm_user_id: &str) -> Self {
        Self {
            channel_id: non_blank(Some(channel_id)),
            dm_user_id: non_blank(Some(dm_user_id)),
        }
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn dm_user_id(&self) -> Option<&str> {
        self.dm_user_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Input to `fake_message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FakeMessageRequest {
    #[serde(flatten)]
    pub target: MessageTarget,
    /// Author to impersonate
    pub user_id: Option<String>,
    pub content: String,
    pub embed: EmbedSpec,
    pub username: Option<String>,
    pub avatar: Option<String>,
    /// Display instant; blank or unparseable means "now"
    pub timestamp: Option<String>,
}

impl FakeMessageRequest {
    pub fn new(target: MessageTarget, content: impl Into<String>) -> Self {
        Self {
            target,
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

impl From<&AutoFakeMessage> for FakeMessageRequest {
    fn from(entry: &AutoFakeMessage) -> Self {
        Self {
            target: MessageTarget::from_parts(&entry.channel_id, &entry.dm_user_id),
            user_id: non_blank(Some(&entry.user_id)),
            content: entry.content.clone(),
            embed: entry.embed.clone(),
            username: non_blank(entry.username.as_deref()),
            avatar: non_blank(entry.avatar.as_deref()),
            timestamp: non_blank(entry.timestamp.as_deref()),
        }
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
