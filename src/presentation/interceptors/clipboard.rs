//! Clipboard Interceptor

use crate::application::services::ContentRewriter;
use crate::shared::error::AppError;
use crate::shared::interceptor::Interceptor;

/// Rewrites ids and links in copied text.
pub struct ClipboardInterceptor {
    rewriter: ContentRewriter,
}

impl ClipboardInterceptor {
    pub fn new(rewriter: ContentRewriter) -> Self {
        Self { rewriter }
    }
}

impl Interceptor<String> for ClipboardInterceptor {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn intercept(&self, text: &mut String) -> Result<(), AppError> {
        *text = self.rewriter.rewrite_text(text);
        Ok(())
    }
}
