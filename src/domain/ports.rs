//! # Host Ports
//!
//! Typed contracts for every host surface the crate touches. The host client
//! is opaque; a [`ModuleLocator`] probes it once per surface and either hands
//! back an implementation of the matching port or nothing.
//!
//! Hookable surfaces (dispatcher, clipboard, link builders, content renderer)
//! expose an [`InterceptorChain`] that runs before the surface acts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{
    DispatchAction, LinkBuilderArgs, MessageRecord, OutgoingMessage, RenderCall, RenderNode,
    UserProfile,
};
use crate::shared::error::AppError;
use crate::shared::interceptor::InterceptorChain;

/// The client event bus.
pub trait EventDispatcher: Send + Sync {
    /// Interceptors run before any listener is notified.
    fn interceptors(&self) -> &InterceptorChain<DispatchAction>;

    /// Deliver an action to every listener.
    fn dispatch(&self, action: DispatchAction);
}

/// Native clipboard bridge.
pub trait ClipboardModule: Send + Sync {
    fn interceptors(&self) -> &InterceptorChain<String>;

    fn set_string(&self, text: String);

    fn get_string(&self) -> String;
}

/// A helper that builds navigation links from raw identifiers.
pub trait LinkBuilderModule: Send + Sync {
    fn interceptors(&self) -> &InterceptorChain<LinkBuilderArgs>;

    fn build(&self, args: LinkBuilderArgs) -> String;
}

/// The component that renders message content.
pub trait ContentRenderer: Send + Sync {
    /// Interceptors run after the render, on the produced node.
    fn interceptors(&self) -> &InterceptorChain<RenderCall>;

    fn render(&self, args: Vec<Value>) -> RenderNode;
}

/// Message entry points of the host.
#[async_trait]
pub trait MessageActions: Send + Sync {
    /// Local receipt: the record goes straight onto the bus, never the network.
    fn receive_message(&self, channel_id: &str, message: MessageRecord) -> Result<(), AppError>;

    /// Real outbound send.
    async fn send_message(&self, channel_id: &str, message: OutgoingMessage) -> Result<(), AppError>;
}

/// Lookup of existing direct-message channels.
#[cfg_attr(test, mockall::automock)]
pub trait DmChannelStore: Send + Sync {
    fn dm_from_user_id(&self, user_id: &str) -> Option<String>;
}

/// Lookup of cached user profiles.
#[cfg_attr(test, mockall::automock)]
pub trait UserStore: Send + Sync {
    fn get_user(&self, user_id: &str) -> Option<UserProfile>;
}

/// Authenticated REST request issued through the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub url: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

/// The host's REST client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpApi: Send + Sync {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, AppError>;
}

/// Probes the host for each surface.
///
/// Each probe is cheap and side-effect free; callers poll it through
/// [`crate::infrastructure::discovery::wait_for`] until it yields or times out.
pub trait ModuleLocator: Send + Sync {
    fn dispatcher(&self) -> Option<Arc<dyn EventDispatcher>>;

    fn clipboard(&self) -> Option<Arc<dyn ClipboardModule>>;

    /// Every module that looks like a channel link builder.
    fn link_builders(&self) -> Vec<Arc<dyn LinkBuilderModule>>;

    fn content_renderer(&self) -> Option<Arc<dyn ContentRenderer>>;

    fn message_actions(&self) -> Option<Arc<dyn MessageActions>>;

    fn dm_channels(&self) -> Option<Arc<dyn DmChannelStore>>;

    fn http(&self) -> Option<Arc<dyn HttpApi>>;

    fn users(&self) -> Option<Arc<dyn UserStore>>;
}
