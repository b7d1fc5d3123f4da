//! Host command layer.
//!
//! Commands are registered by name in a process-wide [`CommandRegistry`]
//! and invoked with a [`CommandContext`] and a [`RenderRequest`]. They
//! always return a [`CommandResult`]; errors are logged, never raised to
//! the caller.
//!
//! The registry knows nothing about render sessions: each command builds
//! its own [`RenderPipeline`] from the context it is given.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::RwLock;

use lumen_graphics::{
    Extent2d, FrameBuffer, FrameBufferHandle, PixelRect, ProgressListener, RenderError,
    RenderMode, RenderOutcome, RenderPipeline, RenderSettings, SceneChangeQueue,
};

/// Result reported back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Success,
    Failure,
}

/// Parameters of a render command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    /// Size of the view being rendered.
    pub view: Extent2d,
    /// Rectangle of the view to render; `None` renders all of it.
    pub region: Option<PixelRect>,
    pub mode: RenderMode,
    /// Start through the windowed path instead of modal polling.
    pub in_window: bool,
    /// Composite the region over the current display.
    pub composite: bool,
}

impl RenderRequest {
    /// Request rendering all of a `width` x `height` view.
    pub fn full(width: u32, height: u32, mode: RenderMode) -> Self {
        Self {
            view: Extent2d::new(width, height),
            region: None,
            mode,
            in_window: false,
            composite: false,
        }
    }
}

/// State commands share with the host.
pub struct CommandContext {
    /// Scene kept in sync with the host document.
    pub scene: Arc<SceneChangeQueue>,
    pub settings: RenderSettings,
    /// Image currently displayed by the host; commands replace it.
    pub display: Option<FrameBufferHandle>,
}

impl CommandContext {
    pub fn new(scene: Arc<SceneChangeQueue>, settings: RenderSettings) -> Self {
        Self {
            scene,
            settings,
            display: None,
        }
    }
}

/// A named entry point exposed to the host.
pub trait Command: Send + Sync {
    /// Name the command is registered and invoked under.
    fn name(&self) -> &'static str;

    /// Run the command. Must not panic.
    fn run(&self, context: &mut CommandContext, request: &RenderRequest) -> CommandResult;
}

/// Process-wide registry of commands keyed by name.
pub struct CommandRegistry {
    commands: RwLock<BTreeMap<&'static str, Arc<dyn Command>>>,
}

static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(BTreeMap::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static CommandRegistry {
        REGISTRY.get_or_init(CommandRegistry::new)
    }

    /// Register `command` under its name.
    ///
    /// Returns `false` and keeps the existing command if the name is taken.
    pub fn register(&self, command: Arc<dyn Command>) -> bool {
        let mut commands = self.commands.write();
        let name = command.name();
        if commands.contains_key(name) {
            log::warn!("Command '{name}' is already registered");
            return false;
        }
        commands.insert(name, command);
        log::debug!("Registered command '{name}'");
        true
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.read().get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.read().keys().copied().collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register [`RenderCommand`] and [`RenderRegionCommand`] in `registry`.
pub fn register_builtin_commands(registry: &CommandRegistry) {
    registry.register(Arc::new(RenderCommand));
    registry.register(Arc::new(RenderRegionCommand));
}

// ============================================================================
// Render commands
// ============================================================================

/// Renders the whole view.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderCommand;

impl Command for RenderCommand {
    fn name(&self) -> &'static str {
        "render"
    }

    fn run(&self, context: &mut CommandContext, request: &RenderRequest) -> CommandResult {
        let mut pipeline = pipeline_for(context, request.mode);
        let result = pipeline
            .begin_render(request.view, request.mode)
            .and_then(|buffer| drive(&mut pipeline, buffer, false));
        finish(context, self.name(), result)
    }
}

/// Renders a rectangle of the view, optionally composited over the display.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderRegionCommand;

impl Command for RenderRegionCommand {
    fn name(&self) -> &'static str {
        "render-region"
    }

    fn run(&self, context: &mut CommandContext, request: &RenderRequest) -> CommandResult {
        let region = request
            .region
            .unwrap_or_else(|| PixelRect::from_extent(request.view));
        let mut pipeline = pipeline_for(context, request.mode);

        let base = match &context.display {
            Some(display) if request.composite && display.extent() == request.view => {
                Some(Arc::clone(display))
            }
            Some(_) if request.composite => {
                log::warn!("Display size differs from the view, rendering without compositing");
                None
            }
            None if request.composite => {
                log::warn!("Nothing displayed to composite over");
                None
            }
            _ => None,
        };

        let begun = match base {
            Some(base) => pipeline.begin_render_composite(&base, region, request.mode),
            None => pipeline.begin_render_region(request.view, region, request.mode),
        };
        let result = begun.and_then(|buffer| drive(&mut pipeline, buffer, request.in_window));
        finish(context, self.name(), result)
    }
}

fn pipeline_for(context: &CommandContext, mode: RenderMode) -> RenderPipeline {
    let pipeline = RenderPipeline::new(context.settings.clone()).with_scene(Arc::clone(&context.scene));
    match mode {
        RenderMode::Interactive => pipeline.with_progress_listener(progress_logger()),
        RenderMode::Quiet => pipeline,
    }
}

fn drive(
    pipeline: &mut RenderPipeline,
    buffer: FrameBufferHandle,
    in_window: bool,
) -> Result<(FrameBufferHandle, RenderOutcome), RenderError> {
    let outcome = if in_window {
        pipeline.render_in_window()?;
        let outcome = pipeline.wait_for_completion(Duration::MAX);
        pipeline.end_render().or(outcome)
    } else {
        pipeline.render()?;
        Some(pipeline.run_modal()?)
    };
    Ok((buffer, outcome.unwrap_or(RenderOutcome::Failed)))
}

fn finish(
    context: &mut CommandContext,
    name: &str,
    result: Result<(FrameBufferHandle, RenderOutcome), RenderError>,
) -> CommandResult {
    match result {
        Ok((buffer, outcome)) => {
            context.display = Some(buffer);
            match outcome {
                RenderOutcome::Completed => CommandResult::Success,
                other => {
                    log::warn!("Command '{name}' ended {other}");
                    CommandResult::Failure
                }
            }
        }
        Err(err) => {
            log::error!("Command '{name}' failed: {err}");
            CommandResult::Failure
        }
    }
}

/// Log progress at info level every tenth of the way.
fn progress_logger() -> ProgressListener {
    let last_decile = AtomicU32::new(0);
    Arc::new(move |label, value| {
        let decile = (value * 10.0).floor() as u32;
        if last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            log::info!("{label} {:.0}%", value * 100.0);
        }
    })
}

/// The image the last successful command left on display.
pub fn displayed(context: &CommandContext) -> Option<&FrameBuffer> {
    context.display.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_graphics::{Color4, PixelPacing};

    fn context() -> CommandContext {
        CommandContext::new(
            Arc::new(SceneChangeQueue::detached()),
            RenderSettings::default().with_pixel_pacing(PixelPacing::NONE),
        )
    }

    struct Named(&'static str);

    impl Command for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn run(&self, _context: &mut CommandContext, _request: &RenderRequest) -> CommandResult {
            CommandResult::Success
        }
    }

    #[test]
    fn test_registry_keyed_by_name() {
        let registry = CommandRegistry::new();
        register_builtin_commands(&registry);
        assert!(!registry.register(Arc::new(Named("render"))));
        assert!(registry.register(Arc::new(Named("preview"))));

        assert_eq!(registry.names(), vec!["preview", "render", "render-region"]);
        assert!(registry.get("render-region").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_global_registry_is_shared() {
        let first = CommandRegistry::global() as *const CommandRegistry;
        let second = CommandRegistry::global() as *const CommandRegistry;
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_command_fills_display() {
        let mut context = context();
        let result = RenderCommand.run(&mut context, &RenderRequest::full(4, 4, RenderMode::Quiet));
        assert_eq!(result, CommandResult::Success);

        let display = displayed(&context).unwrap();
        let placeholder = Color4::new(1.0, 0.5, 0.75, 1.0);
        assert!(display.to_pixels().iter().all(|&p| p == placeholder));
    }

    #[test]
    fn test_render_command_reports_failure() {
        let mut context = context();
        let result = RenderCommand.run(&mut context, &RenderRequest::full(0, 4, RenderMode::Quiet));
        assert_eq!(result, CommandResult::Failure);
        assert!(context.display.is_none());
    }
}
