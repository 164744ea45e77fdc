//! Inline Time Interceptor

use crate::application::services::RenderOverlay;
use crate::domain::RenderCall;
use crate::shared::error::AppError;
use crate::shared::interceptor::Interceptor;

/// Appends the exact time to rendered synthetic messages.
pub struct InlineTimeInterceptor {
    overlay: RenderOverlay,
}

impl InlineTimeInterceptor {
    pub fn new(overlay: RenderOverlay) -> Self {
        Self { overlay }
    }
}

impl Interceptor<RenderCall> for InlineTimeInterceptor {
    fn name(&self) -> &'static str {
        "inline_time"
    }

    fn intercept(&self, call: &mut RenderCall) -> Result<(), AppError> {
        self.overlay.decorate(call);
        Ok(())
    }
}
