//! Lifecycle Tests
//!
//! One-shot install, stop, feature toggles and discovery failures.

use std::sync::Arc;

use idremap::domain::ports::{ClipboardModule, ContentRenderer, EventDispatcher, LinkBuilderModule};
use idremap::infrastructure::{MemoryHost, Surface};
use pretty_assertions::assert_eq;

use crate::common::*;

#[tokio::test]
async fn test_second_start_is_noop() {
    let test_app = TestApp::started().await;

    assert!(test_app.app.is_started());
    assert_eq!(test_app.app.start().await, None);

    assert_eq!(test_app.host.dispatcher.interceptors().len(), 1);
    assert_eq!(test_app.host.clipboard.interceptors().len(), 1);
    assert_eq!(test_app.host.link_builder.interceptors().len(), 1);
    assert_eq!(test_app.host.content_renderer.interceptors().len(), 1);
}

#[tokio::test]
async fn test_start_reports_installed_features() {
    let test_app = TestApp::build(&standard_rules());

    let report = test_app.app.start().await.unwrap();

    assert_eq!(
        report.installed,
        vec!["dispatcher", "clipboard", "link_builders", "inline_time_overlay"]
    );
    assert!(report.unavailable.is_empty());
    assert!(!report.auto_dispatch_scheduled);
}

#[tokio::test]
async fn test_stop_removes_hooks() {
    let test_app = TestApp::started().await;

    test_app.app.stop();

    assert!(!test_app.app.is_started());
    assert!(test_app.host.dispatcher.interceptors().is_empty());
    assert!(test_app.host.clipboard.interceptors().is_empty());

    test_app.host.clipboard.set_string(OLD_USER.to_string());
    assert_eq!(test_app.host.clipboard.get_string(), OLD_USER);
}

#[tokio::test]
async fn test_disabled_features_are_skipped() {
    let extra = format!("{}\n[features]\nclipboard = false\ninline_time_overlay = false\n", standard_rules());
    let test_app = TestApp::build(&extra);

    let report = test_app.app.start().await.unwrap();

    assert_eq!(report.installed, vec!["dispatcher", "link_builders"]);
    assert!(test_app.host.clipboard.interceptors().is_empty());
    assert!(test_app.host.content_renderer.interceptors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_missing_surface_disables_only_its_feature() {
    let host = Arc::new(MemoryHost::new());
    host.withhold(Surface::Clipboard);
    host.withhold(Surface::LinkBuilders);
    let test_app = TestApp::build_on(host, &standard_rules());

    let report = test_app.app.start().await.unwrap();

    assert_eq!(report.installed, vec!["dispatcher", "inline_time_overlay"]);
    assert_eq!(report.unavailable, vec!["clipboard", "link_builders"]);
    assert_eq!(test_app.host.dispatcher.interceptors().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_waits_for_late_surface() {
    let host = Arc::new(MemoryHost::new());
    host.withhold(Surface::Clipboard);
    let test_app = TestApp::build_on(host.clone(), &standard_rules());

    let reveal = {
        let host = host.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            host.reveal(Surface::Clipboard);
        })
    };

    let report = test_app.app.start().await.unwrap();
    reveal.await.unwrap();

    assert!(report.installed.contains(&"clipboard"));
    assert_eq!(host.clipboard.interceptors().len(), 1);
}

#[test]
fn test_overlapping_id_maps_rejected() {
    let source = r#"
[[id_maps]]
old_id = "1100000000000000001"
new_id = "1200000000000000001"

[[id_maps]]
old_id = "1200000000000000001"
new_id = "1300000000000000001"
"#;

    let err = idremap::config::Settings::from_toml(source).unwrap_err();
    assert!(err.to_string().contains("1200000000000000001"));
}
