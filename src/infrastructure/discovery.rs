//! Host Module Discovery
//!
//! Host surfaces appear asynchronously while the client boots. Probes are
//! polled at a fixed interval until they yield or a timeout elapses.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::config::DiscoverySettings;
use crate::shared::error::AppError;

/// How long and how often to poll for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl DiscoveryPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_settings(settings: &DiscoverySettings) -> Self {
        Self::new(
            Duration::from_millis(settings.timeout_ms),
            Duration::from_millis(settings.poll_interval_ms.max(1)),
        )
    }
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(8000), Duration::from_millis(100))
    }
}

/// Poll `probe` until it yields a module.
///
/// # Errors
///
/// Returns `AppError::ModuleUnavailable` once `policy.timeout` has elapsed
/// without a hit.
pub async fn wait_for<T, F>(module: &'static str, policy: DiscoveryPolicy, mut probe: F) -> Result<T, AppError>
where
    F: FnMut() -> Option<T>,
{
    let started = Instant::now();

    loop {
        if let Some(found) = probe() {
            tracing::trace!(module, elapsed_ms = started.elapsed().as_millis() as u64, "Module located");
            return Ok(found);
        }

        if started.elapsed() >= policy.timeout {
            tracing::warn!(module, timeout_ms = policy.timeout.as_millis() as u64, "Module not found");
            return Err(AppError::ModuleUnavailable {
                module,
                timeout_ms: policy.timeout.as_millis() as u64,
            });
        }

        sleep(policy.interval).await;
    }
}
