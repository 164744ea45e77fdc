//! Message Rewrite Interceptor
//!
//! Rewrites message records carried by bus actions before any listener sees
//! them.

use serde_json::{Map, Value};

use crate::application::services::ContentRewriter;
use crate::domain::{ActionType, DispatchAction, MessageRecord};
use crate::shared::error::AppError;
use crate::shared::interceptor::Interceptor;

/// Payload keys that may hold the record of a single-message action.
const RECORD_KEYS: [&str; 2] = ["message", "messageRecord"];

/// Rewrites `MESSAGE_CREATE`, `MESSAGE_UPDATE` and `LOAD_MESSAGES_SUCCESS`.
pub struct MessageRewriteInterceptor {
    rewriter: ContentRewriter,
}

impl MessageRewriteInterceptor {
    pub fn new(rewriter: ContentRewriter) -> Self {
        Self { rewriter }
    }

    fn rewrite_single(&self, payload: &mut Map<String, Value>) -> Result<(), AppError> {
        let Some(key) = RECORD_KEYS
            .into_iter()
            .find(|key| payload.get(*key).is_some_and(Value::is_object))
        else {
            return Ok(());
        };

        match payload.get_mut(key) {
            Some(slot) => self.rewrite_value(slot),
            None => Ok(()),
        }
    }

    /// Rewrite every element of `messages`, carrying on past bad elements.
    fn rewrite_bulk(&self, payload: &mut Map<String, Value>) -> Result<(), AppError> {
        let Some(Value::Array(messages)) = payload.get_mut("messages") else {
            return Ok(());
        };

        let total = messages.len();
        let mut failed = 0;
        for (index, message) in messages.iter_mut().enumerate() {
            if let Err(e) = self.rewrite_value(message) {
                failed += 1;
                tracing::debug!(index, error = %e, "Skipping malformed message in bulk load");
            }
        }

        if failed > 0 {
            return Err(AppError::MalformedPayload(format!(
                "{} of {} loaded messages could not be rewritten",
                failed, total
            )));
        }
        Ok(())
    }

    /// Decode, rewrite and merge the result back over the original value.
    ///
    /// On a decode failure the value is left exactly as it was.
    fn rewrite_value(&self, slot: &mut Value) -> Result<(), AppError> {
        if !slot.is_object() {
            return Err(AppError::MalformedPayload("message is not an object".into()));
        }

        let mut record: MessageRecord = serde_json::from_value(slot.clone())
            .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
        self.rewriter.rewrite_record(&mut record);

        merge(slot, serde_json::to_value(&record)?);
        Ok(())
    }
}

impl Interceptor<DispatchAction> for MessageRewriteInterceptor {
    fn name(&self) -> &'static str {
        "message_rewrite"
    }

    fn intercept(&self, action: &mut DispatchAction) -> Result<(), AppError> {
        match action.kind() {
            ActionType::MessageCreate | ActionType::MessageUpdate => {
                self.rewrite_single(&mut action.payload)
            }
            ActionType::LoadMessagesSuccess => self.rewrite_bulk(&mut action.payload),
            ActionType::Other => Ok(()),
        }
    }
}

/// Overlay `patch` onto `target`, touching only keys the target already has.
///
/// Rewriting never introduces fields, so keys absent from the original stay
/// absent. Fields the record could not decode are omitted from the patch
/// and keep their original value, explicit nulls included.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if let Some(existing) = target.get_mut(&key) {
                    merge(existing, value);
                }
            }
        }
        (Value::Array(target), Value::Array(patch)) => {
            // A length mismatch means the patch is not a rewrite of this array
            if target.len() == patch.len() {
                for (existing, value) in target.iter_mut().zip(patch) {
                    merge(existing, value);
                }
            }
        }
        (target, patch) => *target = patch,
    }
}
