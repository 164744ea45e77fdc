//! Synthesis Tests
//!
//! Fake, injected and sent messages travelling through the in-memory host.

use idremap::application::dto::{AutoDispatchReport, FakeMessageRequest, MessageTarget, QuickOutcome};
use idremap::application::services::SYSTEM_AUTHOR_NAME;
use idremap::domain::ports::DmChannelStore;
use idremap::domain::{EmbedSpec, MessageRecord, UserProfile, OVERLAY_MARKER_KEY};
use idremap::infrastructure::Surface;
use idremap::shared::error::AppError;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::*;

fn delivered_record(action: &idremap::domain::DispatchAction) -> MessageRecord {
    serde_json::from_value(action.payload["message"].clone()).unwrap()
}

#[tokio::test]
async fn test_fake_message_reaches_bus_with_marker() {
    let test_app = TestApp::started().await;
    let mut events = test_app.events();

    let mut request = FakeMessageRequest::new(MessageTarget::channel("1300000000000000000"), "hi");
    request.timestamp = Some("2025-09-01T13:35:00-04:00".into());
    let record = test_app.app.console().fake_message(request).await.unwrap();

    assert_eq!(record.text(), "hi");
    assert_eq!(record.overlay_timestamp.as_deref(), Some("2025-09-01T17:35:00.000Z"));

    let delivered = next_event(&mut events).await;
    assert_eq!(delivered.action_type, "MESSAGE_CREATE");
    assert_eq!(delivered.payload["channelId"], json!("1300000000000000000"));
    assert_eq!(delivered.payload["optimistic"], json!(false));
    assert_eq!(
        delivered.payload["message"][OVERLAY_MARKER_KEY],
        json!("2025-09-01T17:35:00.000Z")
    );
    assert_eq!(delivered_record(&delivered).text(), "hi");
}

#[tokio::test]
async fn test_fake_message_author_is_rewritten_on_bus() {
    let test_app = TestApp::started().await;
    test_app.host.users.insert(UserProfile {
        id: OLD_USER.into(),
        username: "Tweety".into(),
        discriminator: "0".into(),
        avatar: Some("a1b2".into()),
        ..Default::default()
    });
    let mut events = test_app.events();

    let mut request = FakeMessageRequest::new(MessageTarget::channel("1300000000000000000"), "hello");
    request.user_id = Some(OLD_USER.into());
    let record = test_app.app.console().fake_message(request).await.unwrap();

    let author = record.author.as_ref().unwrap();
    assert_eq!(author.id, OLD_USER);
    assert_eq!(author.username, "Tweety");
    assert_eq!(author.avatar.as_deref(), Some("a1b2"));

    let delivered = delivered_record(&next_event(&mut events).await);
    let author = delivered.author.unwrap();
    assert_eq!(author.id, NEW_USER);
    assert_eq!(author.username, "Emaytee");
}

#[tokio::test]
async fn test_invalid_timestamp_falls_back_to_now() {
    let test_app = TestApp::started().await;
    let before = chrono::Utc::now() - chrono::Duration::milliseconds(1);

    let mut request = FakeMessageRequest::new(MessageTarget::channel("1300000000000000000"), "hi");
    request.timestamp = Some("the day after tomorrow".into());
    let record = test_app.app.console().fake_message(request).await.unwrap();

    let marker = idremap::shared::time::parse_instant(record.overlay_timestamp.as_deref().unwrap()).unwrap();
    assert!(marker >= before);
    assert!(marker <= chrono::Utc::now());
}

#[tokio::test]
async fn test_dm_target_opens_channel_once() {
    let test_app = TestApp::started().await;

    let first = test_app
        .app
        .console()
        .fake_message(FakeMessageRequest::new(MessageTarget::dm(OLD_USER), "one"))
        .await
        .unwrap();
    let second = test_app
        .app
        .console()
        .fake_message(FakeMessageRequest::new(MessageTarget::dm(OLD_USER), "two"))
        .await
        .unwrap();

    assert_eq!(first.channel_id, second.channel_id);
    assert_eq!(test_app.host.dm_channels.dm_from_user_id(OLD_USER), Some(first.channel_id));

    let requests = test_app.host.http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "/users/@me/channels");
    assert_eq!(requests[0].body, json!({ "recipient_id": OLD_USER }));
}

#[tokio::test]
async fn test_no_target_is_resolution_error() {
    let test_app = TestApp::started().await;

    let err = test_app
        .app
        .console()
        .fake_message(FakeMessageRequest::new(MessageTarget::from_parts("", " "), "hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::TargetResolution(_)));
}

#[tokio::test(start_paused = true)]
async fn test_dm_without_http_is_unavailable() {
    let test_app = TestApp::started().await;
    test_app.host.withhold(Surface::Http);

    let err = test_app
        .app
        .console()
        .fake_message(FakeMessageRequest::new(MessageTarget::dm("1400000000000000009"), "hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ModuleUnavailable { module: "http", .. }));
}

#[tokio::test]
async fn test_inject_and_send() {
    let test_app = TestApp::started().await;
    let target = MessageTarget::channel("1300000000000000000");
    let embed = EmbedSpec {
        title: "Notice".into(),
        description: "body".into(),
        ..Default::default()
    };

    let injected = test_app
        .app
        .console()
        .inject_message(&target, "note", &embed)
        .await
        .unwrap();
    assert_eq!(injected.author.as_ref().unwrap().username, SYSTEM_AUTHOR_NAME);
    assert!(injected.is_synthetic());
    assert!(test_app.host.message_actions.sent().is_empty());

    let sent = test_app
        .app
        .console()
        .send_message(&target, "real", &embed)
        .await
        .unwrap();
    assert_eq!(sent.embed.as_ref().and_then(|e| e.title.as_deref()), Some("Notice"));

    let recorded = test_app.host.message_actions.sent();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "1300000000000000000");
    assert_eq!(recorded[0].1.content, "real");
}

#[tokio::test]
async fn test_quick_send_from_config() {
    let extra = format!(
        "{}\n[quick]\nmode = \"send\"\nchannel_id = \"1300000000000000000\"\ncontent = \"quick hello\"\n",
        standard_rules()
    );
    let test_app = TestApp::build(&extra);
    test_app.app.start().await.unwrap();

    let outcome = test_app.app.console().quick().await.unwrap();

    assert!(matches!(outcome, QuickOutcome::Send(ref msg) if msg.content == "quick hello"));
    assert_eq!(test_app.host.message_actions.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_auto_dispatch_runs_after_start() {
    let extra = format!(
        r#"{}
[[auto_fake_messages]]
delay_ms = 1000
channel_id = "1300000000000000000"
user_id = "{OLD_USER}"
content = "first"
timestamp = "2025-09-01T13:35:00-04:00"

[[auto_fake_messages]]
content = "nowhere to go"

[[auto_fake_messages]]
enabled = false
channel_id = "1300000000000000000"
content = "disabled"

[[auto_fake_messages]]
delay_ms = 250
dm_user_id = "{OLD_USER}"
content = "last"
"#,
        standard_rules()
    );
    let test_app = TestApp::build(&extra);
    let mut events = test_app.events();

    let report = test_app.app.start().await.unwrap();
    assert!(report.auto_dispatch_scheduled);

    let summary = test_app.app.wait_for_auto_dispatch().await.unwrap();
    assert_eq!(
        summary,
        AutoDispatchReport {
            delivered: 2,
            failed: 1,
            skipped: 1
        }
    );
    assert_eq!(summary.total(), 4);

    let first = delivered_record(&next_event(&mut events).await);
    assert_eq!(first.text(), "first");
    assert_eq!(first.author.unwrap().id, NEW_USER);
    let last = delivered_record(&next_event(&mut events).await);
    assert_eq!(last.text(), "last");
}
