//! Render error types.

/// Errors surfaced by the render pipeline and the render worker.
///
/// Cancellation is not an error: a cancelled session ends with
/// [`RenderOutcome::Cancelled`](crate::RenderOutcome::Cancelled).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The worker thread could not be started.
    #[error("render worker failed to start: {0}")]
    StartFailed(String),
    /// The frame buffer could not be allocated at the requested size.
    #[error("frame buffer {width}x{height} unavailable: {reason}")]
    ResourceUnavailable {
        width: u32,
        height: u32,
        reason: String,
    },
    /// The requested render region does not fit the target.
    #[error("render region {region:?} does not fit a {width}x{height} target")]
    InvalidRegion {
        region: crate::PixelRect,
        width: u32,
        height: u32,
    },
    /// An operation needed a frame buffer but `begin_render` was not called.
    #[error("render has not begun")]
    NotStarted,
    /// A render worker is already running for this pipeline.
    #[error("a render is already in progress")]
    AlreadyRendering,
    /// The pixel shader reported a failure.
    #[error("shading failed: {0}")]
    Shade(String),
}
