//! # Lumen Graphics
//!
//! Scene synchronization and progressive rendering for Lumen.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`SceneChangeQueue`] - Applies host scene deltas to a consistent snapshot
//! - [`RenderContext`] - Cancellable background worker painting a frame buffer
//! - [`RenderPipeline`] - Session lifecycle: begin, render, poll, end
//! - [`RenderEngine`] - Strategy the pipeline delegates lifecycle steps to
//! - [`RenderSettings`] - Session configuration
//!
//! ## Example
//!
//! ```ignore
//! use lumen_graphics::{Extent2d, RenderMode, RenderPipeline, RenderSettings, SceneChangeQueue};
//!
//! let queue = Arc::new(SceneChangeQueue::new(document));
//! queue.apply_view_delta(view);
//!
//! let mut pipeline = RenderPipeline::new(RenderSettings::default()).with_scene(queue);
//! let buffer = pipeline.begin_render(Extent2d::new(640, 480), RenderMode::Interactive)?;
//! pipeline.render()?;
//! let outcome = pipeline.run_modal()?;
//! ```

mod error;
pub mod pipeline;
pub mod render;
pub mod scene;
mod settings;
pub mod types;

// Re-export main types for convenience
pub use error::RenderError;
pub use pipeline::{AsyncRenderEngine, RenderEngine, RenderMode, RenderPipeline};
pub use render::{
    CompletionSignal, FrameBuffer, FrameBufferHandle, PixelShader, ProgressListener,
    RenderContext, RenderOutcome, RenderProgress, RenderState, RenderTask, SceneShader,
    SolidShader,
};
pub use scene::{SceneChangeQueue, SceneError, SceneSnapshot, SceneSource};
pub use settings::{PixelPacing, RenderSettings};
pub use types::{Color4, Extent2d, PixelRect, ScreenRect};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
pub fn init() {
    log::info!("Lumen Graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_detached_queue_is_empty() {
        let queue = SceneChangeQueue::detached();
        assert!(queue.read().is_empty());
        assert_eq!(queue.version(), 0);
    }
}
