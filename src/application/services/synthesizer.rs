//! Message Synthesizer
//!
//! Builds message records that look like they came from the server and
//! hands them to the host's local-receive entry point, so they appear in the
//! client without touching the network. Also fronts the host's real send.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::application::dto::{AutoDispatchReport, FakeMessageRequest, MessageTarget};
use crate::config::AutoFakeMessage;
use crate::domain::ports::{HttpRequest, ModuleLocator};
use crate::domain::{
    AuthorRecord, EmbedSpec, MessageRecord, OutgoingMessage, Snowflake, UserProfile,
};
use crate::infrastructure::discovery::{wait_for, DiscoveryPolicy};
use crate::shared::error::AppError;
use crate::shared::time::{canonical, parse_instant};

/// Username shown on injected messages.
pub const SYSTEM_AUTHOR_NAME: &str = "IDPlus";

const UNKNOWN_USERNAME: &str = "Unknown User";
const FALLBACK_DISCRIMINATOR: &str = "0000";
const CREATE_DM_URL: &str = "/users/@me/channels";

/// Synthesis operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisService: Send + Sync {
    /// Resolve a target to a channel id, opening a DM channel if needed.
    async fn resolve_target(&self, target: &MessageTarget) -> Result<String, AppError>;

    /// Look up a cached user profile.
    async fn user_info(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    /// Deliver a message that appears to come from `request.user_id`.
    async fn fake_message(&self, request: FakeMessageRequest) -> Result<MessageRecord, AppError>;

    /// Deliver a message from the fixed system author.
    async fn inject_message(
        &self,
        target: &MessageTarget,
        content: &str,
        embed: &EmbedSpec,
    ) -> Result<MessageRecord, AppError>;

    /// Send a real message through the host.
    async fn send_message(
        &self,
        target: &MessageTarget,
        content: &str,
        embed: &EmbedSpec,
    ) -> Result<OutgoingMessage, AppError>;

    /// Play back configured fake messages in order.
    async fn run_auto_dispatch(&self, entries: &[AutoFakeMessage]) -> AutoDispatchReport;
}

/// SynthesisService implementation backed by host modules.
pub struct MessageSynthesizer {
    locator: Arc<dyn ModuleLocator>,
    discovery: DiscoveryPolicy,
}

impl MessageSynthesizer {
    pub fn new(locator: Arc<dyn ModuleLocator>, discovery: DiscoveryPolicy) -> Self {
        Self { locator, discovery }
    }

    /// Existing DM channel for `user_id`, or a freshly created one.
    async fn ensure_dm_channel(&self, user_id: &str) -> Result<String, AppError> {
        match wait_for("dm_channels", self.discovery, || self.locator.dm_channels()).await {
            Ok(store) => {
                if let Some(channel_id) = store.dm_from_user_id(user_id).filter(|id| !id.is_empty()) {
                    return Ok(channel_id);
                }
            }
            Err(e) => tracing::debug!(error = %e, "DM store unavailable; creating channel"),
        }

        let http = wait_for("http", self.discovery, || self.locator.http()).await?;
        let response = http
            .post(HttpRequest {
                url: CREATE_DM_URL.to_string(),
                body: json!({ "recipient_id": user_id }),
            })
            .await?;

        let channel_id = (200..300u16)
            .contains(&response.status)
            .then(|| response.body.get("id").and_then(id_value))
            .flatten();

        match channel_id {
            Some(channel_id) => {
                tracing::debug!(user_id = %user_id, channel_id = %channel_id, "DM channel created");
                Ok(channel_id)
            }
            None => {
                tracing::warn!(user_id = %user_id, status = response.status, "DM creation returned no channel id");
                Err(AppError::DmCreation {
                    user_id: user_id.to_string(),
                })
            }
        }
    }

    async fn deliver(&self, channel_id: &str, record: MessageRecord) -> Result<MessageRecord, AppError> {
        let actions = wait_for("message_actions", self.discovery, || self.locator.message_actions()).await?;
        actions.receive_message(channel_id, record.clone())?;

        tracing::info!(
            channel_id = %channel_id,
            message_id = %record.id,
            "Synthetic message delivered"
        );

        Ok(record)
    }

    /// Author for a fake message: override, then profile, then placeholder.
    fn build_author(request: &FakeMessageRequest, profile: Option<UserProfile>) -> AuthorRecord {
        let mut author = profile.map(AuthorRecord::from).unwrap_or_else(|| AuthorRecord {
            username: UNKNOWN_USERNAME.to_string(),
            ..Default::default()
        });

        author.id = request.user_id().unwrap_or("0").to_string();
        if author.discriminator.is_empty() {
            author.discriminator = FALLBACK_DISCRIMINATOR.to_string();
        }
        if let Some(username) = request.username.as_deref().filter(|name| !name.trim().is_empty()) {
            author.username = username.to_string();
        }
        if let Some(avatar) = request.avatar.as_deref().filter(|avatar| !avatar.trim().is_empty()) {
            author.avatar = Some(avatar.to_string());
        }

        author
    }
}

#[async_trait]
impl SynthesisService for MessageSynthesizer {
    async fn resolve_target(&self, target: &MessageTarget) -> Result<String, AppError> {
        if let Some(channel_id) = target.channel_id() {
            return Ok(channel_id.to_string());
        }
        if let Some(user_id) = target.dm_user_id() {
            return self.ensure_dm_channel(user_id).await;
        }

        Err(AppError::TargetResolution(
            "provide a channel_id or a dm_user_id".into(),
        ))
    }

    async fn user_info(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        let users = wait_for("users", self.discovery, || self.locator.users()).await?;
        Ok(users.get_user(user_id))
    }

    async fn fake_message(&self, request: FakeMessageRequest) -> Result<MessageRecord, AppError> {
        let channel_id = self.resolve_target(&request.target).await?;
        let instant = resolve_timestamp(request.timestamp.as_deref());
        let timestamp = canonical(instant);

        let profile = match request.user_id() {
            Some(user_id) => self.user_info(user_id).await.unwrap_or_else(|e| {
                tracing::warn!(user_id = %user_id, error = %e, "Profile lookup failed");
                None
            }),
            None => None,
        };
        let author = Self::build_author(&request, profile);

        let record = MessageRecord {
            id: Snowflake::synthetic(instant).to_string(),
            kind: Some(0),
            content: Some(request.content),
            channel_id: channel_id.clone(),
            author: Some(author),
            mentions: Some(Vec::new()),
            mention_roles: Some(Vec::new()),
            mention_everyone: Some(false),
            message_reference: None,
            embeds: Some(request.embed.to_record().into_iter().collect()),
            timestamp: Some(timestamp.clone()),
            edited_timestamp: None,
            flags: Some(0),
            pinned: Some(false),
            tts: Some(false),
            overlay_timestamp: Some(timestamp),
            extra: Map::new(),
        };

        self.deliver(&channel_id, record).await
    }

    async fn inject_message(
        &self,
        target: &MessageTarget,
        content: &str,
        embed: &EmbedSpec,
    ) -> Result<MessageRecord, AppError> {
        let channel_id = self.resolve_target(target).await?;
        let now = Utc::now();
        let timestamp = canonical(now);

        let record = MessageRecord {
            id: Snowflake::synthetic(now).to_string(),
            kind: Some(0),
            content: Some(content.to_string()),
            channel_id: channel_id.clone(),
            author: Some(AuthorRecord {
                id: "0".into(),
                username: SYSTEM_AUTHOR_NAME.into(),
                discriminator: FALLBACK_DISCRIMINATOR.into(),
                bot: true,
                ..Default::default()
            }),
            embeds: Some(embed.to_record().into_iter().collect()),
            timestamp: Some(timestamp.clone()),
            overlay_timestamp: Some(timestamp),
            ..Default::default()
        };

        self.deliver(&channel_id, record).await
    }

    async fn send_message(
        &self,
        target: &MessageTarget,
        content: &str,
        embed: &EmbedSpec,
    ) -> Result<OutgoingMessage, AppError> {
        let channel_id = self.resolve_target(target).await?;
        let actions = wait_for("message_actions", self.discovery, || self.locator.message_actions()).await?;

        let payload = OutgoingMessage {
            content: content.to_string(),
            embed: embed.to_record(),
            ..Default::default()
        };
        actions.send_message(&channel_id, payload.clone()).await?;

        tracing::info!(channel_id = %channel_id, "Message sent");
        Ok(payload)
    }

    async fn run_auto_dispatch(&self, entries: &[AutoFakeMessage]) -> AutoDispatchReport {
        let mut report = AutoDispatchReport::default();

        for (index, entry) in entries.iter().enumerate() {
            if !entry.enabled {
                report.skipped += 1;
                continue;
            }
            if entry.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(entry.delay_ms)).await;
            }

            match self.fake_message(FakeMessageRequest::from(entry)).await {
                Ok(record) => {
                    report.delivered += 1;
                    tracing::debug!(index, message_id = %record.id, "Auto fake message delivered");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(index, error = %e, "Auto fake message failed");
                }
            }
        }

        tracing::info!(
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "Auto-dispatch finished"
        );
        report
    }
}

/// Requested display instant, or now when absent or unparseable.
pub fn resolve_timestamp(requested: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = requested.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Utc::now();
    };

    parse_instant(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Invalid timestamp; using current time");
        Utc::now()
    })
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
