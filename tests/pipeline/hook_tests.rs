//! Interception Tests
//!
//! Bus, clipboard, link builder and render hooks installed by `start`.

use std::sync::Arc;

use idremap::domain::ports::{ClipboardModule, ContentRenderer, EventDispatcher, LinkBuilderModule};
use idremap::domain::{Child, Children, DispatchAction, LinkBuilderArgs};
use idremap::shared::error::AppError;
use idremap::shared::interceptor::Interceptor;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::*;

fn action(value: serde_json::Value) -> DispatchAction {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_odd_author_fields_do_not_block_rewrite() {
    let test_app = TestApp::started().await;
    let mut events = test_app.events();

    test_app.host.dispatcher.dispatch(action(json!({
        "type": "MESSAGE_CREATE",
        "message": {
            "id": "1400000000000000000",
            "content": format!("https://discord.com/users/{OLD_USER}"),
            "author": { "id": OLD_USER, "username": "Tweety", "bot": null },
            "mention_roles": [1]
        }
    })));

    let delivered = next_event(&mut events).await;
    let message = &delivered.payload["message"];
    assert_eq!(message["content"], json!(format!("https://discord.com/users/{NEW_USER}")));
    assert_eq!(message["author"]["id"], json!(NEW_USER));
    assert_eq!(message["author"]["username"], json!("Emaytee"));
    assert_eq!(message["author"]["bot"], serde_json::Value::Null);
    assert_eq!(message["mention_roles"], json!([1]));
}

#[tokio::test]
async fn test_message_create_rewritten_before_listeners() {
    let test_app = TestApp::started().await;
    let mut events = test_app.events();

    test_app.host.dispatcher.dispatch(action(json!({
        "type": "MESSAGE_CREATE",
        "channelId": OLD_CHANNEL,
        "message": {
            "id": "1400000000000000000",
            "channel_id": OLD_CHANNEL,
            "content": format!("https://discord.com/channels/{OLD_GUILD}/{OLD_CHANNEL}/1400000000000000000"),
            "author": { "id": OLD_USER, "username": "Tweety", "discriminator": "0" },
            "mentions": [{ "id": OLD_USER }]
        }
    })));

    let delivered = next_event(&mut events).await;
    let message = &delivered.payload["message"];

    assert_eq!(
        message["content"],
        json!(format!(
            "https://discord.com/channels/{NEW_GUILD}/{NEW_CHANNEL}/1400000000000000000"
        ))
    );
    assert_eq!(message["author"]["id"], json!(NEW_USER));
    assert_eq!(message["author"]["username"], json!("Emaytee"));
    assert_eq!(message["mentions"][0]["id"], json!(NEW_USER));
}

#[tokio::test]
async fn test_bulk_load_rewrites_good_elements() {
    let test_app = TestApp::started().await;
    let mut events = test_app.events();

    test_app.host.dispatcher.dispatch(action(json!({
        "type": "LOAD_MESSAGES_SUCCESS",
        "channelId": OLD_CHANNEL,
        "messages": [
            { "id": "1", "content": OLD_USER },
            { "id": "2", "content": ["not", "text"] },
            { "id": "3", "author": { "id": OLD_USER, "username": "Tweety" } }
        ]
    })));

    let delivered = next_event(&mut events).await;
    let messages = &delivered.payload["messages"];

    assert_eq!(messages[0]["content"], json!(NEW_USER));
    assert_eq!(messages[1]["content"], json!(["not", "text"]));
    assert_eq!(messages[2]["author"]["id"], json!(NEW_USER));
}

#[tokio::test]
async fn test_unrelated_action_delivered_unchanged() {
    let test_app = TestApp::started().await;
    let mut events = test_app.events();

    let typing = action(json!({ "type": "TYPING_START", "userId": OLD_USER }));
    test_app.host.dispatcher.dispatch(typing.clone());

    assert_eq!(next_event(&mut events).await, typing);
}

struct Failing;

impl Interceptor<DispatchAction> for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn intercept(&self, _action: &mut DispatchAction) -> Result<(), AppError> {
        Err(AppError::Host("boom".into()))
    }
}

#[tokio::test]
async fn test_failing_interceptor_is_isolated() {
    let host = Arc::new(idremap::infrastructure::MemoryHost::new());
    host.dispatcher.interceptors().register(Arc::new(Failing));
    let test_app = TestApp::build_on(host, &standard_rules());
    test_app.app.start().await.unwrap();
    let mut events = test_app.events();

    test_app.host.dispatcher.dispatch(action(json!({
        "type": "MESSAGE_CREATE",
        "message": { "id": "1", "content": OLD_USER }
    })));

    let delivered = next_event(&mut events).await;
    assert_eq!(delivered.payload["message"]["content"], json!(NEW_USER));
}

#[tokio::test]
async fn test_clipboard_copy_is_rewritten() {
    let test_app = TestApp::started().await;

    test_app.host.clipboard.set_string(OLD_USER.to_string());
    assert_eq!(test_app.host.clipboard.get_string(), NEW_USER);

    test_app
        .host
        .clipboard
        .set_string(format!("see https://discord.com/users/{OLD_USER} please"));
    assert_eq!(
        test_app.host.clipboard.get_string(),
        format!("see https://discord.com/users/{NEW_USER} please")
    );
}

#[tokio::test]
async fn test_link_builder_ids_are_remapped() {
    let test_app = TestApp::started().await;

    let positional = LinkBuilderArgs::from_values(vec![
        json!(OLD_GUILD),
        json!(OLD_CHANNEL),
        json!("1400000000000000000"),
    ]);
    assert_eq!(
        test_app.host.link_builder.build(positional),
        format!("https://discord.com/channels/{NEW_GUILD}/{NEW_CHANNEL}/1400000000000000000")
    );

    let options = LinkBuilderArgs::from_values(vec![json!({ "userId": OLD_USER })]);
    assert_eq!(
        test_app.host.link_builder.build(options),
        format!("https://discord.com/users/{NEW_USER}")
    );
}

#[tokio::test]
async fn test_link_builder_options_keep_caller_keys() {
    let test_app = TestApp::started().await;

    let options = LinkBuilderArgs::from_values(vec![json!({
        "guildId": OLD_GUILD,
        "channelId": OLD_CHANNEL,
        "jump": true,
        "source": "context-menu"
    })]);
    assert_eq!(
        test_app.host.link_builder.build(options),
        format!("https://discord.com/channels/{NEW_GUILD}/{NEW_CHANNEL}")
    );

    assert_eq!(
        test_app.host.link_builder.calls(),
        vec![vec![json!({
            "guildId": NEW_GUILD,
            "channelId": NEW_CHANNEL,
            "jump": true,
            "source": "context-menu"
        })]]
    );
}

#[tokio::test]
async fn test_render_of_plain_message_untouched() {
    let test_app = TestApp::started().await;

    let node = test_app
        .host
        .content_renderer
        .render(vec![json!({ "message": { "id": "1", "content": "hi" } })]);

    assert_eq!(node.children, Children::Many(vec![Child::Text("hi".into())]));
}

#[tokio::test]
async fn test_render_of_synthetic_message_shows_time() {
    let test_app = TestApp::started().await;

    let mut request = idremap::application::dto::FakeMessageRequest::new(
        idremap::application::dto::MessageTarget::channel(OLD_CHANNEL),
        "hi",
    );
    request.timestamp = Some("2025-09-01T13:35:00-04:00".into());
    let record = test_app.app.console().fake_message(request).await.unwrap();

    let node = test_app
        .host
        .content_renderer
        .render(vec![json!({ "message": record })]);

    let Children::Many(children) = &node.children else {
        panic!("expected appended children, got {:?}", node.children);
    };
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], Child::Text("hi".into()));
    let Child::Node(span) = &children[1] else {
        panic!("expected a time node");
    };
    assert_eq!(span.kind, "span");
    assert_eq!(span.children, Children::Many(vec![Child::Text("05:35:00 PM".into())]));
}
