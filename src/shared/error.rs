//! Application Error Types
//!
//! Centralized error taxonomy for rewriting, synthesis and host discovery.

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Target resolution failed: {0}")]
    TargetResolution(String),

    #[error("DM creation failed for user {user_id}")]
    DmCreation { user_id: String },

    #[error("Invalid timestamp: {0}")]
    TimestampParse(String),

    #[error("Module unavailable: {module} did not appear within {timeout_ms}ms")]
    ModuleUnavailable {
        module: &'static str,
        timeout_ms: u64,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Whether this error belongs to the synthesis resolution path.
    ///
    /// Resolution errors are surfaced to callers; everything else is
    /// recovered or logged where it happens.
    pub fn is_resolution(&self) -> bool {
        matches!(self, AppError::TargetResolution(_) | AppError::DmCreation { .. })
    }
}
