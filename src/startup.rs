//! Application Startup
//!
//! Builds the rewriting and synthesis services from settings and installs
//! the interceptors on whatever host surfaces can be discovered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::application::dto::AutoDispatchReport;
use crate::application::services::{
    ConsoleControl, ContentRewriter, MessageSynthesizer, RenderOverlay, RewriteContext,
};
use crate::config::Settings;
use crate::domain::ports::{
    ClipboardModule, ContentRenderer, EventDispatcher, LinkBuilderModule, ModuleLocator,
};
use crate::infrastructure::discovery::{wait_for, DiscoveryPolicy};
use crate::presentation::interceptors::{
    ClipboardInterceptor, InlineTimeInterceptor, LinkBuilderInterceptor, MessageRewriteInterceptor,
};
use crate::shared::error::AppError;
use crate::shared::interceptor::InterceptorId;

/// Shared, immutable state built once from settings
struct AppState {
    settings: Arc<Settings>,
    locator: Arc<dyn ModuleLocator>,
    context: Arc<RewriteContext>,
    console: ConsoleControl,
}

/// A registration that `stop` has to undo.
enum InstalledHook {
    Dispatcher(Arc<dyn EventDispatcher>, InterceptorId),
    Clipboard(Arc<dyn ClipboardModule>, InterceptorId),
    LinkBuilder(Arc<dyn LinkBuilderModule>, InterceptorId),
    Renderer(Arc<dyn ContentRenderer>, InterceptorId),
}

impl InstalledHook {
    fn remove(self) -> bool {
        match self {
            Self::Dispatcher(module, id) => module.interceptors().unregister(id),
            Self::Clipboard(module, id) => module.interceptors().unregister(id),
            Self::LinkBuilder(module, id) => module.interceptors().unregister(id),
            Self::Renderer(module, id) => module.interceptors().unregister(id),
        }
    }
}

/// What a `start` call managed to install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartReport {
    pub installed: Vec<&'static str>,
    pub unavailable: Vec<&'static str>,
    pub auto_dispatch_scheduled: bool,
}

/// Application instance
pub struct Application {
    state: AppState,
    discovery: DiscoveryPolicy,
    installed: AtomicBool,
    hooks: Mutex<Vec<InstalledHook>>,
    auto_dispatch: Mutex<Option<JoinHandle<AutoDispatchReport>>>,
}

impl Application {
    /// Build the application from settings and a host locator.
    pub fn build(settings: Settings, locator: Arc<dyn ModuleLocator>) -> Self {
        let discovery = DiscoveryPolicy::from_settings(&settings.discovery);
        let context = Arc::new(RewriteContext::from_settings(&settings));
        tracing::info!(
            id_maps = context.ids.len(),
            username_rules = context.username_rules.len(),
            tag_rules = context.tag_rules.len(),
            "Rewrite rules loaded"
        );

        let synthesizer = Arc::new(MessageSynthesizer::new(locator.clone(), discovery));
        let console = ConsoleControl::new(
            synthesizer,
            settings.quick.clone(),
            settings.auto_fake_messages.clone(),
        );

        let state = AppState {
            settings: Arc::new(settings),
            locator,
            context,
            console,
        };

        Self {
            state,
            discovery,
            installed: AtomicBool::new(false),
            hooks: Mutex::new(Vec::new()),
            auto_dispatch: Mutex::new(None),
        }
    }

    pub fn console(&self) -> &ConsoleControl {
        &self.state.console
    }

    pub fn is_started(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Wait out the start delay, then install every enabled feature.
    ///
    /// Returns `None` when already started. A feature whose host surface
    /// cannot be found is logged and skipped; the rest still install.
    pub async fn start(&self) -> Option<StartReport> {
        if self.installed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Already started; ignoring");
            return None;
        }

        let delay = self.state.settings.start_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let features = &self.state.settings.features;
        let (dispatcher, clipboard, link_builders, overlay) = tokio::join!(
            self.install_if(features.dispatcher, "dispatcher", self.install_dispatcher()),
            self.install_if(features.clipboard, "clipboard", self.install_clipboard()),
            self.install_if(features.link_builders, "link_builders", self.install_link_builders()),
            self.install_if(features.inline_time_overlay, "inline_time_overlay", self.install_overlay()),
        );

        let mut report = StartReport::default();
        for (feature, outcome) in [dispatcher, clipboard, link_builders, overlay].into_iter().flatten() {
            if outcome {
                report.installed.push(feature);
            } else {
                report.unavailable.push(feature);
            }
        }

        if features.auto_fake_messages && !self.state.settings.auto_fake_messages.is_empty() {
            let console = self.state.console.clone();
            let handle = tokio::spawn(async move { console.run_auto_dispatch().await });
            *self.auto_dispatch.lock() = Some(handle);
            report.auto_dispatch_scheduled = true;
        }

        tracing::info!(
            installed = ?report.installed,
            unavailable = ?report.unavailable,
            auto_dispatch = report.auto_dispatch_scheduled,
            "Hooks installed"
        );
        Some(report)
    }

    /// Remove every installed interceptor.
    pub fn stop(&self) {
        let hooks = std::mem::take(&mut *self.hooks.lock());
        let removed = hooks
            .into_iter()
            .map(InstalledHook::remove)
            .filter(|removed| *removed)
            .count();

        if let Some(handle) = self.auto_dispatch.lock().take() {
            handle.abort();
        }
        self.installed.store(false, Ordering::SeqCst);

        tracing::info!(removed, "Hooks removed");
    }

    /// Wait for scheduled auto-dispatch playback to finish.
    pub async fn wait_for_auto_dispatch(&self) -> Option<AutoDispatchReport> {
        let handle = self.auto_dispatch.lock().take()?;
        match handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(error = %e, "Auto-dispatch task failed");
                None
            }
        }
    }

    async fn install_if(
        &self,
        enabled: bool,
        feature: &'static str,
        install: impl std::future::Future<Output = Result<(), AppError>>,
    ) -> Option<(&'static str, bool)> {
        if !enabled {
            tracing::debug!(feature, "Feature disabled");
            return None;
        }

        match install.await {
            Ok(()) => Some((feature, true)),
            Err(e) => {
                tracing::warn!(feature, error = %e, "Feature not installed");
                Some((feature, false))
            }
        }
    }

    fn rewriter(&self) -> ContentRewriter {
        ContentRewriter::new(self.state.context.clone())
    }

    async fn install_dispatcher(&self) -> Result<(), AppError> {
        let dispatcher = wait_for("dispatcher", self.discovery, || self.state.locator.dispatcher()).await?;
        let id = dispatcher
            .interceptors()
            .register(Arc::new(MessageRewriteInterceptor::new(self.rewriter())));
        self.hooks.lock().push(InstalledHook::Dispatcher(dispatcher, id));
        Ok(())
    }

    async fn install_clipboard(&self) -> Result<(), AppError> {
        let clipboard = wait_for("clipboard", self.discovery, || self.state.locator.clipboard()).await?;
        let id = clipboard
            .interceptors()
            .register(Arc::new(ClipboardInterceptor::new(self.rewriter())));
        self.hooks.lock().push(InstalledHook::Clipboard(clipboard, id));
        Ok(())
    }

    async fn install_link_builders(&self) -> Result<(), AppError> {
        let builders = wait_for("link_builders", self.discovery, || {
            let found = self.state.locator.link_builders();
            (!found.is_empty()).then_some(found)
        })
        .await?;

        let mut hooks = self.hooks.lock();
        for builder in builders {
            let id = builder
                .interceptors()
                .register(Arc::new(LinkBuilderInterceptor::new(self.state.context.clone())));
            hooks.push(InstalledHook::LinkBuilder(builder, id));
        }
        Ok(())
    }

    async fn install_overlay(&self) -> Result<(), AppError> {
        let renderer = wait_for("content_renderer", self.discovery, || {
            self.state.locator.content_renderer()
        })
        .await?;
        let overlay = RenderOverlay::from_settings(&self.state.settings.overlay);
        let id = renderer
            .interceptors()
            .register(Arc::new(InlineTimeInterceptor::new(overlay)));
        self.hooks.lock().push(InstalledHook::Renderer(renderer, id));
        Ok(())
    }
}
