//! Console Control
//!
//! The operator-facing surface: synthesis operations plus a "quick"
//! invocation driven entirely by configuration.

use std::sync::Arc;

use crate::application::dto::{AutoDispatchReport, FakeMessageRequest, MessageTarget, QuickOutcome};
use crate::config::{AutoFakeMessage, QuickMode, QuickSettings};
use crate::domain::{EmbedSpec, MessageRecord, OutgoingMessage, UserProfile};
use crate::shared::error::AppError;

use super::synthesizer::SynthesisService;

/// Console entry points
#[derive(Clone)]
pub struct ConsoleControl {
    synthesizer: Arc<dyn SynthesisService>,
    quick: QuickSettings,
    auto_messages: Arc<Vec<AutoFakeMessage>>,
}

impl ConsoleControl {
    pub fn new(
        synthesizer: Arc<dyn SynthesisService>,
        quick: QuickSettings,
        auto_messages: Vec<AutoFakeMessage>,
    ) -> Self {
        Self {
            synthesizer,
            quick,
            auto_messages: Arc::new(auto_messages),
        }
    }

    pub async fn fake_message(&self, request: FakeMessageRequest) -> Result<MessageRecord, AppError> {
        self.synthesizer.fake_message(request).await
    }

    pub async fn inject_message(
        &self,
        target: &MessageTarget,
        content: &str,
        embed: &EmbedSpec,
    ) -> Result<MessageRecord, AppError> {
        self.synthesizer.inject_message(target, content, embed).await
    }

    pub async fn send_message(
        &self,
        target: &MessageTarget,
        content: &str,
        embed: &EmbedSpec,
    ) -> Result<OutgoingMessage, AppError> {
        self.synthesizer.send_message(target, content, embed).await
    }

    pub async fn user_info(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.synthesizer.user_info(user_id).await
    }

    /// Replay the configured auto fake messages.
    pub async fn run_auto_dispatch(&self) -> AutoDispatchReport {
        self.synthesizer.run_auto_dispatch(&self.auto_messages).await
    }

    /// Run the configured quick action.
    pub async fn quick(&self) -> Result<QuickOutcome, AppError> {
        let target = MessageTarget::from_parts(&self.quick.channel_id, &self.quick.dm_user_id);
        let QuickSettings { content, embed, .. } = &self.quick;

        tracing::debug!(mode = ?self.quick.mode, "Running quick action");

        match self.quick.mode {
            QuickMode::Inject => self
                .synthesizer
                .inject_message(&target, content, embed)
                .await
                .map(QuickOutcome::Inject),
            QuickMode::Send => self
                .synthesizer
                .send_message(&target, content, embed)
                .await
                .map(QuickOutcome::Send),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::synthesizer::MockSynthesisService;
    use mockall::predicate::eq;

    fn quick(mode: QuickMode) -> QuickSettings {
        QuickSettings {
            mode,
            channel_id: "  ".into(),
            dm_user_id: "42".into(),
            content: "hello".into(),
            embed: EmbedSpec::default(),
        }
    }

    #[tokio::test]
    async fn test_quick_inject_treats_blank_channel_as_absent() {
        let mut synth = MockSynthesisService::new();
        synth
            .expect_inject_message()
            .withf(|target, content, _| *target == MessageTarget::dm("42") && content == "hello")
            .times(1)
            .returning(|_, content, _| {
                Ok(MessageRecord {
                    content: Some(content.to_string()),
                    ..Default::default()
                })
            });
        synth.expect_send_message().never();

        let console = ConsoleControl::new(Arc::new(synth), quick(QuickMode::Inject), vec![]);

        match console.quick().await.unwrap() {
            QuickOutcome::Inject(record) => assert_eq!(record.text(), "hello"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quick_send() {
        let mut synth = MockSynthesisService::new();
        synth.expect_inject_message().never();
        synth.expect_send_message().times(1).returning(|_, content, _| {
            Ok(OutgoingMessage {
                content: content.to_string(),
                ..Default::default()
            })
        });

        let console = ConsoleControl::new(Arc::new(synth), quick(QuickMode::Send), vec![]);

        assert!(matches!(console.quick().await.unwrap(), QuickOutcome::Send(msg) if msg.content == "hello"));
    }

    #[tokio::test]
    async fn test_quick_surfaces_resolution_error() {
        let mut synth = MockSynthesisService::new();
        synth
            .expect_inject_message()
            .returning(|_, _, _| Err(AppError::TargetResolution("none".into())));

        let console = ConsoleControl::new(Arc::new(synth), quick(QuickMode::Inject), vec![]);

        assert!(console.quick().await.unwrap_err().is_resolution());
    }

    #[tokio::test]
    async fn test_user_info_passthrough() {
        let mut synth = MockSynthesisService::new();
        synth
            .expect_user_info()
            .with(eq("7"))
            .returning(|_| Ok(None));

        let console = ConsoleControl::new(Arc::new(synth), QuickSettings::default(), vec![]);
        assert_eq!(console.user_info("7").await.unwrap(), None);
    }
}
