//! Progressive rendering on a background worker.
//!
//! This module provides the pieces a render session is built from:
//!
//! - [`FrameBuffer`] - 2D colour target with an active region and an
//!   optional overlay channel
//! - [`RenderContext`] - the worker: row-major pixel loop, cancellation
//!   checks, progress reports, completion
//! - [`RenderTask`] - join handle of a spawned worker thread
//! - [`CompletionSignal`] - one-shot end-of-render notification
//! - [`RenderProgress`] - monotonic progress with an optional listener
//! - [`PixelShader`] - per-pixel colour policy
//!
//! # Threading
//!
//! ```text
//! controller thread                     worker thread
//! ─────────────────                     ─────────────
//! RenderContext::spawn ───────────────► render()
//!                                         for each pixel (row-major):
//! stop_rendering() ── token ─────────────►  checkpoint
//!                                           shade + write
//!                                           report progress
//!                                           yield (pacer)
//! completion.is_signaled() ◄── signal ──  Completed / Cancelled / Failed
//! RenderTask::join ◄──────────────────── thread exit
//! ```

mod completion;
mod context;
mod frame_buffer;
mod progress;
mod shader;

pub use completion::{CompletionSignal, RenderOutcome};
pub use context::{RenderContext, RenderState, RenderTask};
pub use frame_buffer::{FrameBuffer, FrameBufferHandle, OverlayChannel};
pub use progress::{BELOW_ONE, ProgressListener, RenderProgress};
pub use shader::{PixelShader, SceneShader, SolidShader};
