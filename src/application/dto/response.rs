//! Response DTOs

use serde::Serialize;

use crate::domain::{MessageRecord, OutgoingMessage};

/// Outcome of an auto-dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AutoDispatchReport {
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl AutoDispatchReport {
    pub fn total(&self) -> usize {
        self.delivered + self.failed + self.skipped
    }
}

/// What the console "quick" invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "message", rename_all = "lowercase")]
pub enum QuickOutcome {
    Inject(MessageRecord),
    Send(OutgoingMessage),
}
