//! Interceptors
//!
//! The hooks installed on host surfaces. Each one adapts an application
//! service to the argument type of one interceptor chain.

pub mod clipboard;
pub mod inline_time;
pub mod link_builder;
pub mod message_rewrite;

pub use clipboard::ClipboardInterceptor;
pub use inline_time::InlineTimeInterceptor;
pub use link_builder::LinkBuilderInterceptor;
pub use message_rewrite::MessageRewriteInterceptor;
