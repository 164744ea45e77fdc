//! In-Memory Host
//!
//! A self-contained implementation of every host port. Used by the binary
//! and by tests in place of a real client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::domain::ports::{
    ClipboardModule, ContentRenderer, DmChannelStore, EventDispatcher, HttpApi, HttpRequest,
    HttpResponse, LinkBuilderModule, MessageActions, ModuleLocator, UserStore,
};
use crate::domain::{
    Child, DispatchAction, LinkBuilderArgs, LinkOptions, MessageRecord, OutgoingMessage,
    RenderCall, RenderNode, Snowflake, UserProfile,
};
use crate::shared::error::AppError;
use crate::shared::interceptor::InterceptorChain;

const EVENT_CAPACITY: usize = 1024;
const LINK_BASE: &str = "https://discord.com";

/// A host surface that can be withheld from discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Dispatcher,
    Clipboard,
    LinkBuilders,
    ContentRenderer,
    MessageActions,
    DmChannels,
    Http,
    Users,
}

/// Event bus backed by a broadcast channel.
pub struct MemoryDispatcher {
    interceptors: InterceptorChain<DispatchAction>,
    event_tx: broadcast::Sender<DispatchAction>,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            interceptors: InterceptorChain::new(),
            event_tx,
        }
    }

    /// Listen for delivered (post-interceptor) actions.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchAction> {
        self.event_tx.subscribe()
    }
}

impl Default for MemoryDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher for MemoryDispatcher {
    fn interceptors(&self) -> &InterceptorChain<DispatchAction> {
        &self.interceptors
    }

    fn dispatch(&self, mut action: DispatchAction) {
        self.interceptors.run(&mut action);

        let action_type = action.action_type.clone();
        // No receivers is not an error
        let listeners = self.event_tx.send(action).unwrap_or(0);
        tracing::trace!(action_type = %action_type, listeners, "Action dispatched");
    }
}

/// Clipboard buffer.
#[derive(Default)]
pub struct MemoryClipboard {
    interceptors: InterceptorChain<String>,
    buffer: Mutex<String>,
}

impl ClipboardModule for MemoryClipboard {
    fn interceptors(&self) -> &InterceptorChain<String> {
        &self.interceptors
    }

    fn set_string(&self, mut text: String) {
        self.interceptors.run(&mut text);
        *self.buffer.lock() = text;
    }

    fn get_string(&self) -> String {
        self.buffer.lock().clone()
    }
}

/// Builds `https://discord.com/...` navigation links.
#[derive(Default)]
pub struct MemoryLinkBuilder {
    interceptors: InterceptorChain<LinkBuilderArgs>,
    calls: Mutex<Vec<Vec<Value>>>,
}

impl MemoryLinkBuilder {
    /// Arguments of every build call, as they looked after interception.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().clone()
    }
}

impl LinkBuilderModule for MemoryLinkBuilder {
    fn interceptors(&self) -> &InterceptorChain<LinkBuilderArgs> {
        &self.interceptors
    }

    fn build(&self, mut args: LinkBuilderArgs) -> String {
        self.interceptors.run(&mut args);
        self.calls.lock().push(args.clone().into_values());

        match args {
            LinkBuilderArgs::Positional {
                guild_id,
                channel_id,
                message_id,
            } => format!("{}/channels/{}/{}/{}", LINK_BASE, guild_id, channel_id, message_id),
            LinkBuilderArgs::Options(options) => options_link(&options),
            LinkBuilderArgs::Other(_) => LINK_BASE.to_string(),
        }
    }
}

fn options_link(options: &LinkOptions) -> String {
    if let (None, Some(user_id)) = (&options.channel_id, &options.user_id) {
        return format!("{}/users/{}", LINK_BASE, user_id);
    }

    let guild = options.guild_id.as_deref().unwrap_or("@me");
    let mut link = format!("{}/channels/{}", LINK_BASE, guild);
    for id in [&options.channel_id, &options.message_id].into_iter().flatten() {
        link.push('/');
        link.push_str(id);
    }
    link
}

/// Renders message content as a plain node.
#[derive(Default)]
pub struct MemoryContentRenderer {
    interceptors: InterceptorChain<RenderCall>,
}

impl ContentRenderer for MemoryContentRenderer {
    fn interceptors(&self) -> &InterceptorChain<RenderCall> {
        &self.interceptors
    }

    fn render(&self, args: Vec<Value>) -> RenderNode {
        let content = args
            .first()
            .and_then(|arg| arg.get("message").or(Some(arg)))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut call = RenderCall {
            args,
            output: RenderNode::new("MessageContent").with_child(Child::Text(content)),
        };
        self.interceptors.run(&mut call);
        call.output
    }
}

/// Existing direct-message channels by recipient.
#[derive(Default)]
pub struct MemoryDmChannels {
    channels: DashMap<String, String>,
}

impl MemoryDmChannels {
    pub fn insert(&self, user_id: impl Into<String>, channel_id: impl Into<String>) {
        self.channels.insert(user_id.into(), channel_id.into());
    }
}

impl DmChannelStore for MemoryDmChannels {
    fn dm_from_user_id(&self, user_id: &str) -> Option<String> {
        self.channels.get(user_id).map(|entry| entry.value().clone())
    }
}

/// Cached user profiles.
#[derive(Default)]
pub struct MemoryUsers {
    users: DashMap<String, UserProfile>,
}

impl MemoryUsers {
    pub fn insert(&self, profile: UserProfile) {
        self.users.insert(profile.id.clone(), profile);
    }
}

impl UserStore for MemoryUsers {
    fn get_user(&self, user_id: &str) -> Option<UserProfile> {
        self.users.get(user_id).map(|entry| entry.value().clone())
    }
}

/// REST stub that records requests and opens DM channels.
pub struct MemoryHttp {
    dm_channels: Arc<MemoryDmChannels>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MemoryHttp {
    pub fn new(dm_channels: Arc<MemoryDmChannels>) -> Self {
        Self {
            dm_channels,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpApi for MemoryHttp {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, AppError> {
        self.requests.lock().push(request.clone());

        if request.url != "/users/@me/channels" {
            return Ok(HttpResponse {
                status: 404,
                body: json!({ "message": "Unknown route" }),
            });
        }

        let recipient = match request.body.get("recipient_id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Ok(HttpResponse {
                    status: 400,
                    body: json!({ "message": "recipient_id is required" }),
                })
            }
        };

        let channel_id = Snowflake::synthetic(Utc::now()).to_string();
        self.dm_channels.insert(recipient.clone(), channel_id.clone());
        tracing::debug!(recipient = %recipient, channel_id = %channel_id, "DM channel opened");

        Ok(HttpResponse {
            status: 200,
            body: json!({ "id": channel_id, "type": 1, "recipients": [{ "id": recipient }] }),
        })
    }
}

/// Local receipt goes onto the bus; real sends are recorded.
pub struct MemoryMessageActions {
    dispatcher: Arc<MemoryDispatcher>,
    sent: Mutex<Vec<(String, OutgoingMessage)>>,
}

impl MemoryMessageActions {
    pub fn new(dispatcher: Arc<MemoryDispatcher>) -> Self {
        Self {
            dispatcher,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, OutgoingMessage)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MessageActions for MemoryMessageActions {
    fn receive_message(&self, channel_id: &str, message: MessageRecord) -> Result<(), AppError> {
        let action = DispatchAction::message_create(channel_id, &message)?;
        self.dispatcher.dispatch(action);
        Ok(())
    }

    async fn send_message(&self, channel_id: &str, message: OutgoingMessage) -> Result<(), AppError> {
        if channel_id.is_empty() {
            return Err(AppError::Host("send_message requires a channel id".into()));
        }
        self.sent.lock().push((channel_id.to_string(), message));
        Ok(())
    }
}

/// Every host surface, in memory.
pub struct MemoryHost {
    pub dispatcher: Arc<MemoryDispatcher>,
    pub clipboard: Arc<MemoryClipboard>,
    pub link_builder: Arc<MemoryLinkBuilder>,
    pub content_renderer: Arc<MemoryContentRenderer>,
    pub message_actions: Arc<MemoryMessageActions>,
    pub dm_channels: Arc<MemoryDmChannels>,
    pub http: Arc<MemoryHttp>,
    pub users: Arc<MemoryUsers>,
    withheld: DashSet<Surface>,
    // Extra link builders beyond the default one
    extra_link_builders: RwLock<Vec<Arc<dyn LinkBuilderModule>>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        let dispatcher = Arc::new(MemoryDispatcher::new());
        let dm_channels = Arc::new(MemoryDmChannels::default());

        Self {
            message_actions: Arc::new(MemoryMessageActions::new(dispatcher.clone())),
            http: Arc::new(MemoryHttp::new(dm_channels.clone())),
            dispatcher,
            clipboard: Arc::new(MemoryClipboard::default()),
            link_builder: Arc::new(MemoryLinkBuilder::default()),
            content_renderer: Arc::new(MemoryContentRenderer::default()),
            dm_channels,
            users: Arc::new(MemoryUsers::default()),
            withheld: DashSet::new(),
            extra_link_builders: RwLock::new(Vec::new()),
        }
    }

    /// Hide a surface from discovery.
    pub fn withhold(&self, surface: Surface) {
        self.withheld.insert(surface);
    }

    /// Make a withheld surface discoverable again.
    pub fn reveal(&self, surface: Surface) {
        self.withheld.remove(&surface);
    }

    pub fn add_link_builder(&self, builder: Arc<dyn LinkBuilderModule>) {
        self.extra_link_builders.write().push(builder);
    }

    fn exposes(&self, surface: Surface) -> bool {
        !self.withheld.contains(&surface)
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLocator for MemoryHost {
    fn dispatcher(&self) -> Option<Arc<dyn EventDispatcher>> {
        self.exposes(Surface::Dispatcher)
            .then(|| self.dispatcher.clone() as Arc<dyn EventDispatcher>)
    }

    fn clipboard(&self) -> Option<Arc<dyn ClipboardModule>> {
        self.exposes(Surface::Clipboard)
            .then(|| self.clipboard.clone() as Arc<dyn ClipboardModule>)
    }

    fn link_builders(&self) -> Vec<Arc<dyn LinkBuilderModule>> {
        if !self.exposes(Surface::LinkBuilders) {
            return Vec::new();
        }

        let mut builders: Vec<Arc<dyn LinkBuilderModule>> = vec![self.link_builder.clone() as Arc<dyn LinkBuilderModule>];
        builders.extend(self.extra_link_builders.read().iter().cloned());
        builders
    }

    fn content_renderer(&self) -> Option<Arc<dyn ContentRenderer>> {
        self.exposes(Surface::ContentRenderer)
            .then(|| self.content_renderer.clone() as Arc<dyn ContentRenderer>)
    }

    fn message_actions(&self) -> Option<Arc<dyn MessageActions>> {
        self.exposes(Surface::MessageActions)
            .then(|| self.message_actions.clone() as Arc<dyn MessageActions>)
    }

    fn dm_channels(&self) -> Option<Arc<dyn DmChannelStore>> {
        self.exposes(Surface::DmChannels)
            .then(|| self.dm_channels.clone() as Arc<dyn DmChannelStore>)
    }

    fn http(&self) -> Option<Arc<dyn HttpApi>> {
        self.exposes(Surface::Http)
            .then(|| self.http.clone() as Arc<dyn HttpApi>)
    }

    fn users(&self) -> Option<Arc<dyn UserStore>> {
        self.exposes(Surface::Users)
            .then(|| self.users.clone() as Arc<dyn UserStore>)
    }
}
