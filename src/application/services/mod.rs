//! Application Services
//!
//! Rewriting and synthesis logic that coordinates domain records and host
//! ports.
//!
//! ## Available Services
//!
//! - **remap**: Identifier lookup and author rules
//! - **rewriter**: Text, link and message record rewriting
//! - **overlay**: Exact-time overlay for rendered messages
//! - **synthesizer**: Synthetic message creation, DM resolution, real sends
//! - **console**: Operator entry points

pub mod console;
pub mod overlay;
pub mod remap;
pub mod rewriter;
pub mod synthesizer;

pub use console::ConsoleControl;
pub use overlay::{RenderOverlay, TimeFormatter};
pub use remap::{IdentifierMap, RewriteContext};
pub use rewriter::ContentRewriter;
pub use synthesizer::{resolve_timestamp, MessageSynthesizer, SynthesisService, SYSTEM_AUTHOR_NAME};
