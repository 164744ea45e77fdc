//! Application settings and configuration structures.

use std::collections::HashSet;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use validator::Validate;

use crate::domain::{is_snowflake, EmbedSpec};
use crate::shared::validation::validation_message;

/// Root configuration structure. Loaded once at startup; never mutated.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// Feature toggles
    pub features: FeatureSettings,

    /// Inline time overlay formatting
    #[validate(nested)]
    pub overlay: OverlaySettings,

    /// Delay before hooks are installed, in milliseconds
    pub start_delay_ms: u64,

    /// Host module discovery polling
    #[validate(nested)]
    pub discovery: DiscoverySettings,

    /// Identifier remap rows, applied in order
    #[serde(default)]
    pub id_maps: Vec<IdMapRow>,

    /// Username substitution rules, applied in order
    #[serde(default)]
    pub username_rules: Vec<UsernameRule>,

    /// Discriminator substitution rules, applied in order
    #[serde(default)]
    pub tag_rules: Vec<TagRule>,

    /// Fake messages played back after startup
    #[serde(default)]
    pub auto_fake_messages: Vec<AutoFakeMessage>,

    /// Console "quick" invocation
    pub quick: QuickSettings,

    /// Current environment (development, production)
    pub environment: String,
}

/// Feature toggles.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureSettings {
    /// Rewrite copied text
    pub clipboard: bool,

    /// Rewrite message events on the dispatch bus
    pub dispatcher: bool,

    /// Rewrite identifiers passed to link builders
    pub link_builders: bool,

    /// Play back `auto_fake_messages` after startup
    pub auto_fake_messages: bool,

    /// Show the exact time beside synthesized messages
    pub inline_time_overlay: bool,
}

/// Rendering of a single time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FieldStyle {
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "hidden")]
    Hidden,
}

/// Inline time overlay formatting.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OverlaySettings {
    /// BCP 47 locale; decides the 12/24-hour clock unless `hour12` is set
    #[validate(length(min = 1, message = "locale must not be empty"))]
    pub locale: String,

    /// Force a 12-hour (true) or 24-hour (false) clock
    #[serde(default)]
    pub hour12: Option<bool>,

    pub hour: FieldStyle,
    pub minute: FieldStyle,
    pub second: FieldStyle,

    /// `local`, `utc`, or a fixed offset such as `-04:00`
    pub time_zone: String,
}

/// Host module discovery polling.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DiscoverySettings {
    /// Give up on a module after this many milliseconds
    pub timeout_ms: u64,

    /// Probe interval in milliseconds
    #[validate(range(min = 1, message = "poll interval must be positive"))]
    pub poll_interval_ms: u64,
}

/// One identifier remap row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdMapRow {
    pub old_id: String,
    pub new_id: String,
}

impl IdMapRow {
    pub fn new(old_id: impl Into<String>, new_id: impl Into<String>) -> Self {
        Self {
            old_id: old_id.into(),
            new_id: new_id.into(),
        }
    }

    /// Rows missing either side are ignored by the remap engine.
    pub fn is_complete(&self) -> bool {
        !self.old_id.is_empty() && !self.new_id.is_empty()
    }
}

/// Replace an author's display names when their id or username matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UsernameRule {
    pub match_id: Option<String>,
    pub match_username: Option<String>,
    pub new_username: String,
}

/// Replace an author's discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TagRule {
    pub old_tag: String,
    pub new_tag: String,
}

/// One scheduled fake message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutoFakeMessage {
    pub enabled: bool,
    /// Wait before this entry, in milliseconds
    pub delay_ms: u64,
    pub channel_id: String,
    pub dm_user_id: String,
    /// Author to impersonate
    pub user_id: String,
    pub content: String,
    /// Display instant; blank or invalid means "now"
    pub timestamp: Option<String>,
    pub embed: EmbedSpec,
    /// Username override
    pub username: Option<String>,
    /// Avatar override
    pub avatar: Option<String>,
}

impl Default for AutoFakeMessage {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 0,
            channel_id: String::new(),
            dm_user_id: String::new(),
            user_id: String::new(),
            content: String::new(),
            timestamp: None,
            embed: EmbedSpec::default(),
            username: None,
            avatar: None,
        }
    }
}

/// What the console "quick" invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickMode {
    #[default]
    Inject,
    Send,
}

/// Console "quick" invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuickSettings {
    pub mode: QuickMode,
    pub channel_id: String,
    pub dm_user_id: String,
    pub content: String,
    pub embed: EmbedSpec,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables prefixed with `APP__` (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed, or
    /// if it fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::defaults(&environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__FEATURES__CLIPBOARD=false -> features.clipboard = false
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    /// Load settings from a TOML document layered over the defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::defaults("test")?
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    fn defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("features.clipboard", true)?
            .set_default("features.dispatcher", true)?
            .set_default("features.link_builders", true)?
            .set_default("features.auto_fake_messages", true)?
            .set_default("features.inline_time_overlay", true)?
            .set_default("overlay.locale", "en-US")?
            .set_default("overlay.hour", "2-digit")?
            .set_default("overlay.minute", "2-digit")?
            .set_default("overlay.second", "2-digit")?
            .set_default("overlay.time_zone", "local")?
            .set_default("start_delay_ms", 800_i64)?
            .set_default("discovery.timeout_ms", 8000_i64)?
            .set_default("discovery.poll_interval_ms", 100_i64)?
            .set_default("quick.mode", "inject")
    }

    fn validated(settings: Self) -> Result<Self, ConfigError> {
        settings.validate_rules()?;
        Ok(settings)
    }

    /// Check the loaded settings.
    ///
    /// Remapping is only idempotent when no id is both an `old_id` and a
    /// `new_id`, so such overlaps are rejected. Ids that are not snowflakes
    /// are accepted with a warning.
    pub fn validate_rules(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|errors| ConfigError::Message(validation_message(&errors)))?;

        let rows: Vec<&IdMapRow> = self.id_maps.iter().filter(|row| row.is_complete()).collect();

        for row in &rows {
            for id in [&row.old_id, &row.new_id] {
                if !is_snowflake(id) {
                    tracing::warn!(id = %id, "id_maps entry is not a snowflake");
                }
            }
        }

        let old_ids: HashSet<&str> = rows.iter().map(|row| row.old_id.as_str()).collect();
        if let Some(row) = rows.iter().find(|row| old_ids.contains(row.new_id.as_str())) {
            return Err(ConfigError::Message(format!(
                "id_maps: {} is used both as an old_id and as a new_id; remapping would not be idempotent",
                row.new_id
            )));
        }

        Ok(())
    }
}
