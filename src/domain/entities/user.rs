//! User profiles as exposed by the host's user store.

use serde::{Deserialize, Serialize};

use super::message::AuthorRecord;

/// A cached user profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Snowflake ID
    pub id: String,

    pub username: String,

    /// Legacy four-digit tag ("0" for migrated accounts)
    #[serde(default)]
    pub discriminator: String,

    /// Avatar hash
    #[serde(default)]
    pub avatar: Option<String>,

    /// Global display name
    #[serde(default)]
    pub global_name: Option<String>,

    #[serde(default)]
    pub bot: bool,
}

impl From<UserProfile> for AuthorRecord {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            global_name: profile.global_name,
            discriminator: profile.discriminator,
            avatar: profile.avatar,
            bot: profile.bot,
            extra: Default::default(),
        }
    }
}
