//! RenderContext: the progressive render worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use lumen_core::compute::CancellationToken;

use super::completion::{CompletionSignal, RenderOutcome};
use super::frame_buffer::FrameBufferHandle;
use super::progress::{BELOW_ONE, ProgressListener, RenderProgress};
use super::shader::{PixelShader, SceneShader};
use crate::error::RenderError;
use crate::scene::SceneChangeQueue;
use crate::settings::RenderSettings;
use crate::types::Color4;

/// Lifecycle state of a [`RenderContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    /// Created, worker not started.
    Idle,
    /// Worker is painting.
    Running,
    /// Terminal: every pixel written.
    Completed,
    /// Terminal: stopped at a cancellation check.
    Cancelled,
    /// Terminal: stopped on an error.
    Failed,
}

impl RenderState {
    fn to_raw(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
            Self::Failed => 4,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Failed,
        }
    }

    /// Returns `true` for `Completed`, `Cancelled` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle | Self::Running)
    }
}

impl From<RenderOutcome> for RenderState {
    fn from(outcome: RenderOutcome) -> Self {
        match outcome {
            RenderOutcome::Completed => Self::Completed,
            RenderOutcome::Cancelled => Self::Cancelled,
            RenderOutcome::Failed => Self::Failed,
        }
    }
}

/// State and entry routine of one render session's worker.
///
/// The context owns the cancellation token, the frame buffer handle and
/// the completion signal. It is shared as `Arc<RenderContext>` between the
/// worker thread, which runs [`render()`](Self::render), and the
/// controller, which calls [`stop_rendering()`](Self::stop_rendering) and
/// watches the completion signal.
///
/// # State machine
///
/// ```text
/// Idle ──render()──► Running ──┬── region exhausted ──► Completed
///                              ├── token cancelled ───► Cancelled
///                              └── shader error ──────► Failed
/// ```
///
/// Every terminal transition fires the completion signal exactly once.
///
/// # Example
///
/// ```ignore
/// let buffer = Arc::new(FrameBuffer::allocate(Extent2d::new(64, 64), limit)?);
/// let context = Arc::new(
///     RenderContext::new(buffer, RenderSettings::default()).with_scene(queue),
/// );
/// let task = context.spawn()?;
/// // ...
/// context.stop_rendering();
/// let outcome = task.join();
/// ```
pub struct RenderContext {
    state: AtomicU8,
    token: CancellationToken,
    completion: CompletionSignal,
    progress: RenderProgress,
    frame_buffer: FrameBufferHandle,
    scene: Option<Arc<SceneChangeQueue>>,
    shader: Option<Arc<dyn PixelShader>>,
    settings: RenderSettings,
    pixels_written: AtomicU64,
}

impl RenderContext {
    /// Create an idle context painting into `frame_buffer`.
    pub fn new(frame_buffer: FrameBufferHandle, settings: RenderSettings) -> Self {
        Self {
            state: AtomicU8::new(RenderState::Idle.to_raw()),
            token: CancellationToken::new(),
            completion: CompletionSignal::new(),
            progress: RenderProgress::new(),
            frame_buffer,
            scene: None,
            shader: None,
            settings,
            pixels_written: AtomicU64::new(0),
        }
    }

    /// Make the worker scene-aware.
    #[must_use]
    pub fn with_scene(mut self, scene: Arc<SceneChangeQueue>) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Replace the default [`SceneShader`].
    #[must_use]
    pub fn with_shader(mut self, shader: Arc<dyn PixelShader>) -> Self {
        self.shader = Some(shader);
        self
    }

    /// Observe every progress report.
    #[must_use]
    pub fn with_progress_listener(mut self, listener: ProgressListener) -> Self {
        self.progress = RenderProgress::new().with_listener(listener);
        self
    }

    // ------------------------------------------------------------------
    // Controller side
    // ------------------------------------------------------------------

    /// Request cancellation.
    ///
    /// Only sets a flag; the worker stops at its next check. Returns
    /// `true` if this call made the request.
    pub fn stop_rendering(&self) -> bool {
        let requested = self.token.cancel();
        if requested {
            log::debug!("Stop requested in state {:?}", self.state());
        }
        requested
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RenderState {
        RenderState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Returns `true` once the completion signal has fired.
    pub fn is_done(&self) -> bool {
        self.completion.is_signaled()
    }

    /// Terminal outcome, once done.
    pub fn outcome(&self) -> Option<RenderOutcome> {
        self.completion.outcome()
    }

    /// Handle to the completion signal.
    pub fn completion(&self) -> &CompletionSignal {
        &self.completion
    }

    /// Latest progress.
    pub fn progress(&self) -> &RenderProgress {
        &self.progress
    }

    /// The frame buffer being painted.
    pub fn frame_buffer(&self) -> &FrameBufferHandle {
        &self.frame_buffer
    }

    /// Number of pixels written so far.
    pub fn pixels_written(&self) -> u64 {
        self.pixels_written.load(Ordering::Acquire)
    }

    /// The cancellation token observed by the worker.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    // ------------------------------------------------------------------
    // Worker side
    // ------------------------------------------------------------------

    /// Start [`render()`](Self::render) on a new named thread.
    pub fn spawn(self: &Arc<Self>) -> Result<RenderTask, RenderError> {
        let context = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(self.settings.thread_name.clone())
            .spawn(move || {
                let _guard = SignalOnUnwind(&context);
                context.render()
            })
            .map_err(|err| RenderError::StartFailed(err.to_string()))?;

        log::info!("Render worker '{}' started", self.settings.thread_name);
        Ok(RenderTask {
            handle: Some(handle),
            token: self.token.clone(),
        })
    }

    /// Paint the frame buffer's region on the calling thread.
    ///
    /// Fails with [`RenderError::AlreadyRendering`] unless the context is
    /// idle. Otherwise returns the terminal outcome, which has also been
    /// sent through the completion signal.
    pub fn render(&self) -> Result<RenderOutcome, RenderError> {
        self.state
            .compare_exchange(
                RenderState::Idle.to_raw(),
                RenderState::Running.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| RenderError::AlreadyRendering)?;

        let outcome = match self.paint() {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Render failed: {err}");
                RenderOutcome::Failed
            }
        };
        self.finish(outcome);
        Ok(outcome)
    }

    fn paint(&self) -> Result<RenderOutcome, RenderError> {
        let fallback;
        let shader: &dyn PixelShader = match &self.shader {
            Some(shader) => shader.as_ref(),
            None => {
                fallback = SceneShader::new(self.settings.placeholder_color);
                &fallback
            }
        };

        let buffer = &self.frame_buffer;
        let region = buffer.region();
        let total = region.area();
        let mut pacer = self.settings.pixel_pacing.pacer();
        let mut rendered = 0u64;

        log::debug!(
            "Painting {} pixels of a {}x{} target",
            total,
            buffer.extent().width,
            buffer.extent().height
        );

        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                if self.token.checkpoint().is_err() {
                    log::debug!("Cancelled after {rendered} of {total} pixels");
                    return Ok(RenderOutcome::Cancelled);
                }

                let color = self.shade(shader, x, y)?;
                buffer.set_pixel(x, y, color);
                rendered += 1;
                self.pixels_written.store(rendered, Ordering::Release);

                if rendered < total {
                    let value = (rendered as f64 / total as f64) as f32;
                    self.progress
                        .report(&self.settings.progress_label, value.min(BELOW_ONE));
                }
                pacer.tick();
            }
            log::trace!("Row {y} done");
        }

        self.progress.report(&self.settings.done_label, 1.0);
        Ok(RenderOutcome::Completed)
    }

    fn shade(&self, shader: &dyn PixelShader, x: u32, y: u32) -> Result<Color4, RenderError> {
        match &self.scene {
            Some(scene) => shader.shade(x, y, Some(&scene.read())),
            None => shader.shade(x, y, None),
        }
    }

    fn finish(&self, outcome: RenderOutcome) {
        self.state
            .store(RenderState::from(outcome).to_raw(), Ordering::Release);
        if self.completion.signal(outcome) {
            log::info!("Render {outcome} after {} pixels", self.pixels_written());
        }
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("state", &self.state())
            .field("cancelled", &self.token.is_cancelled())
            .field("pixels_written", &self.pixels_written())
            .field("region", &self.frame_buffer.region())
            .field("scene_aware", &self.scene.is_some())
            .finish()
    }
}

/// Ends the session as failed if the worker unwinds.
struct SignalOnUnwind<'a>(&'a RenderContext);

impl Drop for SignalOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("Render worker panicked");
            self.0.finish(RenderOutcome::Failed);
        }
    }
}

/// Handle to a running render worker thread.
///
/// Dropping the task cancels the worker and joins it, so no worker
/// outlives its owner.
#[derive(Debug)]
pub struct RenderTask {
    handle: Option<JoinHandle<Result<RenderOutcome, RenderError>>>,
    token: CancellationToken,
}

impl RenderTask {
    /// Request cancellation of the worker.
    pub fn cancel(&self) -> bool {
        self.token.cancel()
    }

    /// Returns `true` if the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker and return its outcome.
    pub fn join(mut self) -> RenderOutcome {
        self.join_inner()
    }

    fn join_inner(&mut self) -> RenderOutcome {
        let Some(handle) = self.handle.take() else {
            return RenderOutcome::Failed;
        };
        match handle.join() {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                log::warn!("Render worker did not run: {err}");
                RenderOutcome::Failed
            }
            Err(_) => RenderOutcome::Failed,
        }
    }
}

impl Drop for RenderTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.token.cancel();
            self.join_inner();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::FrameBuffer;
    use crate::settings::PixelPacing;
    use crate::types::{Extent2d, PixelRect};
    use parking_lot::Mutex;
    use std::time::Duration;

    fn settings() -> RenderSettings {
        RenderSettings::default().with_pixel_pacing(PixelPacing::NONE)
    }

    fn context(width: u32, height: u32) -> RenderContext {
        let buffer = FrameBuffer::allocate(Extent2d::new(width, height), 1 << 20).unwrap();
        RenderContext::new(Arc::new(buffer), settings())
    }

    struct FailAt(u32, u32);

    impl PixelShader for FailAt {
        fn shade(
            &self,
            x: u32,
            y: u32,
            _scene: Option<&crate::scene::SceneSnapshot>,
        ) -> Result<Color4, RenderError> {
            if (x, y) == (self.0, self.1) {
                Err(RenderError::Shade("boom".to_string()))
            } else {
                Ok(Color4::BLACK)
            }
        }
    }

    #[test]
    fn render_fills_with_placeholder() {
        let context = context(3, 2);
        assert_eq!(context.render().unwrap(), RenderOutcome::Completed);

        let placeholder = settings().placeholder_color;
        assert!(context.frame_buffer().to_pixels().iter().all(|&p| p == placeholder));
        assert_eq!(context.state(), RenderState::Completed);
        assert_eq!(context.pixels_written(), 6);
        assert_eq!(context.progress().value(), 1.0);
        assert_eq!(context.progress().label(), "render done");
    }

    #[test]
    fn stop_before_render_writes_nothing() {
        let context = context(4, 4);
        assert!(context.stop_rendering());
        assert!(!context.stop_rendering());

        assert_eq!(context.render().unwrap(), RenderOutcome::Cancelled);
        assert_eq!(context.pixels_written(), 0);
        assert_eq!(context.progress().reports(), 0);
        assert_eq!(context.completion().accepted_count(), 1);
        let pixels = context.frame_buffer().to_pixels();
        assert!(pixels.iter().all(|&p| p == Color4::TRANSPARENT));
    }

    #[test]
    fn render_twice_is_rejected() {
        let context = context(1, 1);
        context.render().unwrap();
        assert_eq!(context.render(), Err(RenderError::AlreadyRendering));
        assert_eq!(context.completion().accepted_count(), 1);
    }

    #[test]
    fn shader_error_fails_session() {
        let context = context(3, 3).with_shader(Arc::new(FailAt(1, 1)));
        assert_eq!(context.render().unwrap(), RenderOutcome::Failed);
        assert_eq!(context.state(), RenderState::Failed);
        assert_eq!(context.pixels_written(), 4);
        assert!(context.progress().value() < 1.0);
    }

    #[test]
    fn region_render_leaves_outside_untouched() {
        let buffer = FrameBuffer::allocate_region(
            Extent2d::new(4, 4),
            PixelRect::new(1, 2, 2, 1),
            1 << 20,
        )
        .unwrap();
        let context = RenderContext::new(Arc::new(buffer), settings());
        context.render().unwrap();

        let buffer = context.frame_buffer();
        assert_eq!(context.pixels_written(), 2);
        assert_eq!(buffer.pixel(1, 2), Some(settings().placeholder_color));
        assert_eq!(buffer.pixel(2, 2), Some(settings().placeholder_color));
        assert_eq!(buffer.pixel(0, 2), Some(Color4::TRANSPARENT));
        assert_eq!(buffer.pixel(1, 1), Some(Color4::TRANSPARENT));
    }

    struct CancelAt {
        token: CancellationToken,
        at: (u32, u32),
    }

    impl PixelShader for CancelAt {
        fn shade(
            &self,
            x: u32,
            y: u32,
            _scene: Option<&crate::scene::SceneSnapshot>,
        ) -> Result<Color4, RenderError> {
            if (x, y) == self.at {
                self.token.cancel();
            }
            Ok(Color4::WHITE)
        }
    }

    #[test]
    fn cancellation_mid_render_freezes_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let context = context(8, 8);
        let token = context.token().clone();
        let context = context
            .with_shader(Arc::new(CancelAt { token, at: (3, 2) }))
            .with_progress_listener(Arc::new(move |_label, value| sink.lock().push(value)));

        assert_eq!(context.render().unwrap(), RenderOutcome::Cancelled);

        // The pixel being shaded when the stop arrived is still written.
        assert_eq!(context.pixels_written(), 2 * 8 + 4);
        assert_eq!(context.frame_buffer().pixel(3, 2), Some(Color4::WHITE));
        assert_eq!(context.frame_buffer().pixel(4, 2), Some(Color4::TRANSPARENT));

        let seen = seen.lock();
        assert_eq!(seen.len(), 20);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(seen.iter().all(|&value| value < 1.0));
        assert!(context.progress().value() < 1.0);
    }

    #[test]
    fn task_drop_cancels_and_joins() {
        let buffer = FrameBuffer::allocate(Extent2d::new(256, 256), 1 << 20).unwrap();
        let settings = RenderSettings::default().with_pixel_pacing(PixelPacing {
            interval: 1,
            sleep_us: 50,
        });
        let context = Arc::new(RenderContext::new(Arc::new(buffer), settings));

        let task = context.spawn().unwrap();
        drop(task);

        assert!(context.is_done());
        assert_eq!(context.outcome(), Some(RenderOutcome::Cancelled));
        assert!(context.pixels_written() < 256 * 256);
        assert!(context.completion().wait_timeout(Duration::from_secs(1)).is_some());
    }
}
