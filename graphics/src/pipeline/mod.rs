//! Render pipeline controlling one render session at a time.
//!
//! This module provides [`RenderPipeline`], which owns the lifecycle of a
//! render session: it allocates the frame buffer, starts the worker through
//! its [`RenderEngine`], lets the host poll for completion, and tears the
//! session down.
//!
//! # Session Lifecycle
//!
//! ```text
//! ┌───────────────────┐
//! │   begin_render    │  Allocate frame buffer (+ overlay if interactive)
//! └─────────┬─────────┘
//!           │
//!           ▼
//! ┌───────────────────┐
//! │      render       │  Engine starts the worker thread
//! └─────────┬─────────┘
//!           │
//!           ▼
//! ┌───────────────────┐
//! │  continue_modal   │  Polled by the host until false
//! └─────────┬─────────┘
//!           │
//!           ▼
//! ┌───────────────────┐
//! │    end_render     │  Cancel, join the worker, release the buffer
//! └───────────────────┘
//! ```
//!
//! The windowed variant replaces `render` + `continue_modal` with
//! [`RenderPipeline::render_in_window`] and waits on the completion signal.
//!
//! # Example
//!
//! ```ignore
//! use lumen_graphics::{Extent2d, RenderMode, RenderPipeline, RenderSettings};
//!
//! let mut pipeline = RenderPipeline::new(RenderSettings::default()).with_scene(queue);
//! let buffer = pipeline.begin_render(Extent2d::new(640, 480), RenderMode::Interactive)?;
//! pipeline.render()?;
//! let outcome = pipeline.run_modal();
//! save(&buffer);
//! ```

mod engine;

pub use engine::{AsyncRenderEngine, RenderEngine};

use std::sync::Arc;
use std::time::Duration;

use crate::error::RenderError;
use crate::render::{
    FrameBuffer, FrameBufferHandle, PixelShader, ProgressListener, RenderContext, RenderOutcome,
    RenderState, RenderTask,
};
use crate::scene::SceneChangeQueue;
use crate::settings::RenderSettings;
use crate::types::{Extent2d, PixelRect};

/// How a render session was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// Rendering with user interface feedback; attaches an overlay channel.
    #[default]
    Interactive,
    /// Rendering without user interface feedback.
    Quiet,
}

/// Lifecycle controller for render sessions.
///
/// One session at a time: `begin_*` prepares it, [`render`](Self::render)
/// or [`render_in_window`](Self::render_in_window) starts it, and
/// [`end_render`](Self::end_render) finishes it. Dropping the pipeline
/// ends any open session, so no worker outlives it.
///
/// # Thread Safety
///
/// `RenderPipeline` is owned by the controlling thread. The worker shares
/// only the session's [`RenderContext`].
pub struct RenderPipeline<E: RenderEngine = AsyncRenderEngine> {
    engine: E,
    settings: RenderSettings,
    scene: Option<Arc<SceneChangeQueue>>,
    shader: Option<Arc<dyn PixelShader>>,
    progress_listener: Option<ProgressListener>,
    session: Option<Session>,
}

struct Session {
    mode: RenderMode,
    context: Arc<RenderContext>,
    task: Option<RenderTask>,
}

impl RenderPipeline<AsyncRenderEngine> {
    /// Create a pipeline using the threaded engine.
    pub fn new(settings: RenderSettings) -> Self {
        Self::with_engine(AsyncRenderEngine, settings)
    }
}

impl<E: RenderEngine> RenderPipeline<E> {
    /// Create a pipeline delegating to `engine`.
    pub fn with_engine(engine: E, settings: RenderSettings) -> Self {
        Self {
            engine,
            settings,
            scene: None,
            shader: None,
            progress_listener: None,
            session: None,
        }
    }

    /// Render the scene held by `scene`.
    #[must_use]
    pub fn with_scene(mut self, scene: Arc<SceneChangeQueue>) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Use `shader` instead of the default scene shader.
    #[must_use]
    pub fn with_shader(mut self, shader: Arc<dyn PixelShader>) -> Self {
        self.shader = Some(shader);
        self
    }

    /// Observe the progress reports of every session.
    #[must_use]
    pub fn with_progress_listener(mut self, listener: ProgressListener) -> Self {
        self.progress_listener = Some(listener);
        self
    }

    // ------------------------------------------------------------------
    // Begin
    // ------------------------------------------------------------------

    /// Prepare a session rendering a whole target of `size`.
    pub fn begin_render(
        &mut self,
        size: Extent2d,
        mode: RenderMode,
    ) -> Result<FrameBufferHandle, RenderError> {
        self.begin_render_region(size, PixelRect::from_extent(size), mode)
    }

    /// Prepare a session rendering `region` of a target of `size`.
    pub fn begin_render_region(
        &mut self,
        size: Extent2d,
        region: PixelRect,
        mode: RenderMode,
    ) -> Result<FrameBufferHandle, RenderError> {
        self.ensure_idle()?;
        let buffer = FrameBuffer::allocate_region(size, region, self.settings.max_pixels)?;
        Ok(self.open_session(buffer, mode))
    }

    /// Prepare a session rendering `region` composited over `base`.
    pub fn begin_render_composite(
        &mut self,
        base: &FrameBuffer,
        region: PixelRect,
        mode: RenderMode,
    ) -> Result<FrameBufferHandle, RenderError> {
        self.ensure_idle()?;
        let buffer = FrameBuffer::composite_over(base, region, self.settings.max_pixels)?;
        Ok(self.open_session(buffer, mode))
    }

    fn ensure_idle(&mut self) -> Result<(), RenderError> {
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.task.is_some())
        {
            return Err(RenderError::AlreadyRendering);
        }
        // A prepared but never started session is replaced.
        self.end_render();
        Ok(())
    }

    fn open_session(&mut self, buffer: FrameBuffer, mode: RenderMode) -> FrameBufferHandle {
        if mode == RenderMode::Interactive {
            buffer.attach_overlay();
        }
        let buffer = Arc::new(buffer);

        let mut context = RenderContext::new(Arc::clone(&buffer), self.settings.clone());
        if let Some(scene) = &self.scene {
            context = context.with_scene(Arc::clone(scene));
        }
        if let Some(shader) = &self.shader {
            context = context.with_shader(Arc::clone(shader));
        }
        if let Some(listener) = &self.progress_listener {
            context = context.with_progress_listener(Arc::clone(listener));
        }

        log::debug!(
            "Render session prepared ({mode:?}, {}x{})",
            buffer.extent().width,
            buffer.extent().height
        );
        self.session = Some(Session {
            mode,
            context: Arc::new(context),
            task: None,
        });
        buffer
    }

    // ------------------------------------------------------------------
    // Start
    // ------------------------------------------------------------------

    /// Start the prepared session as a modal render.
    ///
    /// On failure the session is released and nothing is left running;
    /// the caller must not poll [`continue_modal`](Self::continue_modal).
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.start(|engine, session| match session.mode {
            RenderMode::Interactive => engine.on_render_begin(&session.context),
            RenderMode::Quiet => engine.on_render_begin_quiet(&session.context),
        })
    }

    /// Start the prepared session as a windowed render.
    ///
    /// Windowed renders are not polled; use
    /// [`wait_for_completion`](Self::wait_for_completion) or
    /// [`is_done`](Self::is_done) instead.
    pub fn render_in_window(&mut self) -> Result<(), RenderError> {
        self.start(|engine, session| engine.on_render_window_begin(&session.context))
    }

    fn start(
        &mut self,
        begin: impl FnOnce(&mut E, &Session) -> Result<RenderTask, RenderError>,
    ) -> Result<(), RenderError> {
        let session = self.session.as_ref().ok_or(RenderError::NotStarted)?;
        if session.task.is_some() || session.context.state() != RenderState::Idle {
            return Err(RenderError::AlreadyRendering);
        }

        match begin(&mut self.engine, session) {
            Ok(task) => {
                if let Some(session) = self.session.as_mut() {
                    session.task = Some(task);
                }
                Ok(())
            }
            Err(err) => {
                log::error!("Render failed to start: {err}");
                self.release();
                Err(match err {
                    RenderError::StartFailed(_) => err,
                    other => RenderError::StartFailed(other.to_string()),
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Poll
    // ------------------------------------------------------------------

    /// Whether a modal render is still in progress.
    ///
    /// `false` once the worker has completed, been cancelled or failed, and
    /// whenever no session is running.
    pub fn continue_modal(&self) -> bool {
        match &self.session {
            Some(session) if session.task.is_some() => {
                self.engine.continue_modal(&session.context)
            }
            _ => false,
        }
    }

    /// Poll [`continue_modal`](Self::continue_modal) until it returns
    /// `false`, then end the session.
    ///
    /// Returns the session's outcome.
    pub fn run_modal(&mut self) -> Result<RenderOutcome, RenderError> {
        let poll = self.settings.poll_interval();
        while self.continue_modal() {
            std::thread::sleep(poll);
        }
        self.end_render().ok_or(RenderError::NotStarted)
    }

    /// Wait for a started session's completion signal.
    ///
    /// Returns `None` if there is no started session or `timeout` elapsed.
    pub fn wait_for_completion(&self, timeout: Duration) -> Option<RenderOutcome> {
        let session = self.session.as_ref()?;
        session.task.as_ref()?;
        session.context.completion().wait_timeout(timeout)
    }

    /// Returns `true` once the current session's worker has finished.
    pub fn is_done(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.context.is_done())
    }

    /// Request cancellation of the running worker.
    pub fn stop_rendering(&self) {
        if let Some(session) = &self.session {
            session.context.stop_rendering();
        }
    }

    /// Context of the current session.
    pub fn context(&self) -> Option<&Arc<RenderContext>> {
        self.session.as_ref().map(|session| &session.context)
    }

    /// Frame buffer of the current session.
    pub fn frame_buffer(&self) -> Option<&FrameBufferHandle> {
        self.context().map(|context| context.frame_buffer())
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The session settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // End
    // ------------------------------------------------------------------

    /// End the current session.
    ///
    /// Requests cancellation (a no-op if the worker already finished),
    /// joins the worker and releases the frame buffer. Calling it again, or
    /// without a session, does nothing and returns `None`.
    ///
    /// Returns the outcome of a started session.
    pub fn end_render(&mut self) -> Option<RenderOutcome> {
        let mut session = self.session.take()?;
        self.engine.on_render_end(&session.context);

        let outcome = session.task.take().map(RenderTask::join);
        if let Some(outcome) = outcome {
            log::info!(
                "Render session ended: {outcome}, {} pixels written",
                session.context.pixels_written()
            );
        } else {
            log::debug!("Render session released before it started");
        }
        outcome
    }

    /// Drop the session without notifying the engine.
    fn release(&mut self) {
        if let Some(mut session) = self.session.take()
            && let Some(task) = session.task.take()
        {
            task.join();
        }
    }
}

impl<E: RenderEngine> Drop for RenderPipeline<E> {
    fn drop(&mut self) {
        self.end_render();
    }
}

impl<E: RenderEngine + std::fmt::Debug> std::fmt::Debug for RenderPipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("engine", &self.engine)
            .field("scene_aware", &self.scene.is_some())
            .field("session", &self.session.as_ref().map(|s| s.context.state()))
            .finish()
    }
}
