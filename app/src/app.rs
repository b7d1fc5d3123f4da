//! Host application: load inputs, replay the scene, run a command.

use std::process::ExitCode;
use std::sync::Arc;

use lumen_graphics::{RenderMode, SceneChangeQueue};

use crate::args::Cli;
use crate::commands::{
    CommandContext, CommandRegistry, CommandResult, RenderRequest, register_builtin_commands,
};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::output;
use crate::script::SceneScript;

/// Command-line host.
///
/// Owns the parsed arguments and plays the part of the host application:
/// it builds the scene change queue from a scene script, looks the
/// requested command up in a [`CommandRegistry`] and writes the displayed
/// image afterwards.
///
/// # Example
///
/// ```ignore
/// use clap::Parser;
/// use lumen_app::{App, Cli};
///
/// fn main() -> std::process::ExitCode {
///     App::run(Cli::parse())
/// }
/// ```
pub struct App {
    cli: Cli,
}

impl App {
    /// Create an application for parsed arguments.
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the application with the process-wide registry.
    ///
    /// Initializes logging and every subsystem, then executes the command.
    pub fn run(cli: Cli) -> ExitCode {
        let mut logger =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        if let Some(level) = cli.log_level {
            logger.filter_level(level.into());
        }
        logger.init();

        lumen_core::init();
        lumen_graphics::init();
        crate::init();

        let registry = CommandRegistry::global();
        register_builtin_commands(registry);

        match Self::new(cli).execute(registry) {
            Ok(CommandResult::Success) => ExitCode::SUCCESS,
            Ok(CommandResult::Failure) => ExitCode::FAILURE,
            Err(err) => {
                log::error!("{err}");
                ExitCode::FAILURE
            }
        }
    }

    /// The parsed arguments.
    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Load the inputs and run the requested command from `registry`.
    pub fn execute(&self, registry: &CommandRegistry) -> Result<CommandResult, AppError> {
        let name = self.cli.command.name();
        let command = registry
            .get(name)
            .ok_or_else(|| AppError::UnknownCommand(name.to_string()))?;

        let mut context = self.prepare()?;
        let request = self.cli.command.request();

        if request.composite {
            self.render_base(registry, &mut context, &request)?;
        }

        log::info!("Running command '{name}'");
        let result = command.run(&mut context, &request);

        if result == CommandResult::Success
            && let (Some(path), Some(display)) = (&self.cli.output, &context.display)
        {
            output::save_png(display, path)?;
        }
        Ok(result)
    }

    /// Build the command context from the config and scene script.
    fn prepare(&self) -> Result<CommandContext, AppError> {
        let config = match &self.cli.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        let scene = match &self.cli.scene {
            Some(path) => {
                let script = SceneScript::load(path)?;
                let queue = SceneChangeQueue::new(Arc::new(script.document()));
                script.replay(&queue)?;
                queue
            }
            None => {
                log::debug!("No scene script, rendering an empty scene");
                SceneChangeQueue::detached()
            }
        };

        Ok(CommandContext::new(Arc::new(scene), config.render))
    }

    /// Put a full render of the view on display for a region to composite over.
    fn render_base(
        &self,
        registry: &CommandRegistry,
        context: &mut CommandContext,
        request: &RenderRequest,
    ) -> Result<(), AppError> {
        let render = registry
            .get("render")
            .ok_or_else(|| AppError::UnknownCommand("render".to_string()))?;
        let base = RenderRequest::full(request.view.width, request.view.height, RenderMode::Quiet);
        if render.run(context, &base) == CommandResult::Failure {
            log::warn!("Base render failed, region will not be composited");
        }
        Ok(())
    }
}
