//! Discord-style Snowflake ID implementation.
//!
//! Snowflake IDs are 64-bit integers with embedded timestamp information.
//! On the wire (and everywhere in this crate) they travel as decimal strings
//! of 17 to 21 digits.
//!
//! ## Structure
//!
//! ```text
//! 64                         22          17          12          0
//! +---------------------------+-----------+-----------+-----------+
//! |         timestamp         |  worker   |  process  |  sequence |
//! |          (42 bits)        |  (5 bits) |  (5 bits) |  (12 bits)|
//! +---------------------------+-----------+-----------+-----------+
//! ```

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discord epoch: 2015-01-01T00:00:00Z in milliseconds
pub const DISCORD_EPOCH: u64 = 1420070400000;

/// Smallest value with 17 decimal digits.
const MIN_SNOWFLAKE: u64 = 10_000_000_000_000_000;

static SNOWFLAKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{17,21}$").expect("valid snowflake regex"));

/// Whether `text` is exactly one snowflake (17 to 21 ASCII digits).
pub fn is_snowflake(text: &str) -> bool {
    SNOWFLAKE_RE.is_match(text)
}

/// A Discord-style Snowflake ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snowflake(pub u64);

impl Snowflake {
    /// Create a Snowflake from its components.
    pub fn from_parts(timestamp_ms: u64, worker_id: u8, process_id: u8, sequence: u16) -> Self {
        let ts = timestamp_ms.saturating_sub(DISCORD_EPOCH) << 22;
        let worker = ((worker_id as u64) & 0x1F) << 17;
        let process = ((process_id as u64) & 0x1F) << 12;
        let seq = (sequence as u64) & 0xFFF;

        Self(ts | worker | process | seq)
    }

    /// Create a Snowflake for a synthetic record created at `at`.
    ///
    /// Worker, process and sequence bits are randomized so two records
    /// synthesized in the same millisecond do not collide. Instants too
    /// close to (or before) the epoch encode fewer than 17 digits; those
    /// use the current time instead.
    pub fn synthetic(at: DateTime<Utc>) -> Self {
        let id = Self::random_at(at);
        if id.0 < MIN_SNOWFLAKE {
            tracing::debug!(at = %at, "Instant predates snowflake range; using now");
            return Self::random_at(Utc::now());
        }
        id
    }

    fn random_at(at: DateTime<Utc>) -> Self {
        let timestamp = at.timestamp_millis().max(DISCORD_EPOCH as i64) as u64;
        Self::from_parts(
            timestamp,
            rand::random::<u8>(),
            rand::random::<u8>(),
            rand::random::<u16>(),
        )
    }

    /// Parse from the decimal string form.
    pub fn parse(text: &str) -> Option<Self> {
        if !is_snowflake(text) {
            return None;
        }
        text.parse().ok().map(Self)
    }

    /// Extract the timestamp from this Snowflake.
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 22) + DISCORD_EPOCH
    }

    /// Get the timestamp as a DateTime.
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp() as i64)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Snowflake> for String {
    fn from(snowflake: Snowflake) -> Self {
        snowflake.to_string()
    }
}
