//! Render engine strategy trait.

use std::sync::Arc;

use crate::error::RenderError;
use crate::render::{RenderContext, RenderTask};

/// Behaviour a [`RenderPipeline`](super::RenderPipeline) delegates to.
///
/// The pipeline owns the session (frame buffer, context, task) and calls
/// into its engine at each lifecycle step.
///
/// # Lifecycle
///
/// 1. `on_render_begin` / `on_render_begin_quiet` / `on_render_window_begin` -
///    start the worker for the context; called once per session
/// 2. `continue_modal` - polled by modal renders until it returns `false`
/// 3. `on_render_end` - called exactly once when the session ends
///
/// # Example
///
/// ```ignore
/// struct Counting {
///     inner: AsyncRenderEngine,
///     ends: usize,
/// }
///
/// impl RenderEngine for Counting {
///     fn on_render_begin(&mut self, ctx: &Arc<RenderContext>) -> Result<RenderTask, RenderError> {
///         self.inner.on_render_begin(ctx)
///     }
///
///     fn on_render_end(&mut self, ctx: &RenderContext) {
///         self.ends += 1;
///         self.inner.on_render_end(ctx);
///     }
/// }
/// ```
pub trait RenderEngine {
    /// Start an interactive render.
    fn on_render_begin(&mut self, context: &Arc<RenderContext>)
    -> Result<RenderTask, RenderError>;

    /// Start a render without user interface feedback.
    fn on_render_begin_quiet(
        &mut self,
        context: &Arc<RenderContext>,
    ) -> Result<RenderTask, RenderError> {
        self.on_render_begin(context)
    }

    /// Start a render into a region of a view, without modal polling.
    ///
    /// Engines that cannot render into a window return
    /// [`RenderError::StartFailed`].
    fn on_render_window_begin(
        &mut self,
        _context: &Arc<RenderContext>,
    ) -> Result<RenderTask, RenderError> {
        Err(RenderError::StartFailed(
            "windowed rendering is not supported by this engine".to_string(),
        ))
    }

    /// Called once when the session ends, before the worker is joined.
    fn on_render_end(&mut self, context: &RenderContext) {
        context.stop_rendering();
    }

    /// Whether a modal render should keep waiting.
    fn continue_modal(&self, context: &RenderContext) -> bool {
        !context.is_done()
    }
}

/// Engine running every session on a dedicated worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncRenderEngine;

impl RenderEngine for AsyncRenderEngine {
    fn on_render_begin(
        &mut self,
        context: &Arc<RenderContext>,
    ) -> Result<RenderTask, RenderError> {
        context.spawn()
    }

    fn on_render_window_begin(
        &mut self,
        context: &Arc<RenderContext>,
    ) -> Result<RenderTask, RenderError> {
        context.spawn()
    }
}
