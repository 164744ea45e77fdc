//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::sync::Arc;
use std::time::Duration;

use idremap::config::Settings;
use idremap::domain::DispatchAction;
use idremap::infrastructure::MemoryHost;
use idremap::startup::Application;
use tokio::sync::broadcast;

/// Snowflakes used across the suite.
pub const OLD_USER: &str = "1329259221409202299";
pub const NEW_USER: &str = "753944929973174283";
pub const OLD_GUILD: &str = "1100000000000000001";
pub const NEW_GUILD: &str = "1200000000000000001";
pub const OLD_CHANNEL: &str = "1100000000000000002";
pub const NEW_CHANNEL: &str = "1200000000000000002";

/// Rules shared by most tests.
pub fn standard_rules() -> String {
    format!(
        r#"
[[id_maps]]
old_id = "{OLD_USER}"
new_id = "{NEW_USER}"

[[id_maps]]
old_id = "{OLD_GUILD}"
new_id = "{NEW_GUILD}"

[[id_maps]]
old_id = "{OLD_CHANNEL}"
new_id = "{NEW_CHANNEL}"

[[username_rules]]
match_id = "{NEW_USER}"
new_username = "Emaytee"

[overlay]
locale = "en-US"
time_zone = "utc"
"#
    )
}

/// Settings with no start delay and fast discovery, layered under `extra`.
pub fn test_settings(extra: &str) -> Settings {
    let source = format!(
        "start_delay_ms = 0\n{extra}\n[discovery]\ntimeout_ms = 50\npoll_interval_ms = 5\n"
    );
    Settings::from_toml(&source).expect("test settings should load")
}

/// Test application wired to an in-memory host
pub struct TestApp {
    pub host: Arc<MemoryHost>,
    pub app: Application,
}

impl TestApp {
    /// Build without starting.
    pub fn build(extra: &str) -> Self {
        Self::build_on(Arc::new(MemoryHost::new()), extra)
    }

    /// Build on a prepared host, e.g. one with withheld surfaces.
    pub fn build_on(host: Arc<MemoryHost>, extra: &str) -> Self {
        let app = Application::build(test_settings(extra), host.clone());
        Self { host, app }
    }

    /// Build and start with the standard rules.
    pub async fn started() -> Self {
        let test_app = Self::build(&standard_rules());
        test_app.app.start().await.expect("first start installs hooks");
        test_app
    }

    pub fn events(&self) -> broadcast::Receiver<DispatchAction> {
        self.host.dispatcher.subscribe()
    }
}

/// Next delivered action, failing the test if none arrives.
pub async fn next_event(events: &mut broadcast::Receiver<DispatchAction>) -> DispatchAction {
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("an action should be delivered")
        .expect("bus should be open")
}
