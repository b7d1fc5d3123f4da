//! # Lumen App
//!
//! Command-line host for the Lumen progressive renderer.
//!
//! The host side of the renderer lives here: a scripted host document that
//! reports scene deltas, a registry of named commands, and PNG output of
//! the displayed image.
//!
//! ## Overview
//!
//! - [`App`] - Loads config and scene script, runs one command
//! - [`Cli`] - Command line arguments
//! - [`CommandRegistry`] - Process-wide commands keyed by name
//! - [`RenderCommand`] / [`RenderRegionCommand`] - Built-in render commands
//! - [`SceneScript`] - TOML scene document and its delta batches
//! - [`AppConfig`] - TOML config carrying [`lumen_graphics::RenderSettings`]
//!
//! ## Example
//!
//! ```ignore
//! use clap::Parser;
//! use lumen_app::{App, Cli};
//!
//! fn main() -> std::process::ExitCode {
//!     App::run(Cli::parse())
//! }
//! ```

mod app;
mod args;
mod commands;
mod config;
mod document;
mod error;
pub mod output;
mod script;

pub use app::App;
pub use args::{Cli, CliCommand, LogLevel, RenderArgs, RenderRegionArgs};
pub use commands::{
    Command, CommandContext, CommandRegistry, CommandResult, RenderCommand, RenderRegionCommand,
    RenderRequest, displayed, register_builtin_commands,
};
pub use config::AppConfig;
pub use document::Document;
pub use error::AppError;
pub use script::{SceneBatch, SceneScript};

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the app subsystem.
pub fn init() {
    log::info!("Lumen App v{} initialized", VERSION);
}
