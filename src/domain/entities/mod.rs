//! # Domain Entities
//!
//! Records that flow through the host client and get rewritten or
//! synthesized by this crate.
//!
//! ## Core Entities
//!
//! - **MessageRecord**: A message with author, mentions, reply reference and embeds
//! - **UserProfile**: A cached user profile from the host's user store
//! - **DispatchAction**: A typed event on the client dispatch bus
//!
//! ## Supporting Entities
//!
//! - **LinkBuilderArgs**: Call shapes of the navigation link builders
//! - **RenderNode / RenderCall**: Output of the message content renderer

mod action;
mod link;
mod message;
mod render;
mod user;

// Re-export Message entity and related types
pub use message::{
    AllowedMentions, AuthorRecord, EmbedRecord, EmbedSpec, EmbedThumbnail, MentionRecord,
    MessageRecord, MessageReference, OutgoingMessage, OVERLAY_MARKER_KEY,
};

// Re-export dispatch types
pub use action::{ActionType, DispatchAction};

pub use link::{LinkBuilderArgs, LinkOptions};

pub use render::{Child, Children, RenderCall, RenderNode};

pub use user::UserProfile;
