//! Command line arguments.
//!
//! Uses clap for CLI parsing with:
//! - Help text (`--help`)
//! - Validation and clear error messages
//! - One subcommand per registered render command

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lumen_graphics::{Extent2d, PixelRect, RenderMode};

use crate::commands::RenderRequest;

/// Lumen progressive renderer.
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    about = "Progressive renderer driven by a scripted host document",
    long_about = "Replays a TOML scene script into the scene change queue and renders it \
        progressively on a background worker.\n\n\
        EXAMPLES:\n\
          # Render a 640x480 image of a scene\n\
          lumen --scene scene.toml --output out.png render --width 640 --height 480\n\
        \n\
          # Render a region of a view and composite it over a full render\n\
          lumen --scene scene.toml render-region --view-width 640 --view-height 480 \\\n\
              --x 100 --y 100 --width 64 --height 64 --composite",
    version
)]
pub struct Cli {
    /// Scene script to replay before rendering.
    #[arg(long, global = true)]
    pub scene: Option<PathBuf>,

    /// TOML config file with a [render] table.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write the final image to this PNG file.
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Log level; overrides RUST_LOG.
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Render subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Render the whole view.
    Render(RenderArgs),
    /// Render a rectangle of the view.
    RenderRegion(RenderRegionArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RenderArgs {
    /// Target width in pixels.
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Target height in pixels.
    #[arg(long, default_value = "480")]
    pub height: u32,

    /// Render without progress feedback or overlay.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RenderRegionArgs {
    /// View width in pixels.
    #[arg(long)]
    pub view_width: u32,

    /// View height in pixels.
    #[arg(long)]
    pub view_height: u32,

    /// Left edge of the region.
    #[arg(long)]
    pub x: u32,

    /// Top edge of the region.
    #[arg(long)]
    pub y: u32,

    /// Region width.
    #[arg(long)]
    pub width: u32,

    /// Region height.
    #[arg(long)]
    pub height: u32,

    /// Render without modal polling, waiting on completion instead.
    #[arg(long)]
    pub in_window: bool,

    /// Composite the region over a full render of the view.
    #[arg(long)]
    pub composite: bool,
}

/// Log level accepted by `--log-level`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl CliCommand {
    /// Name the command is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Render(_) => "render",
            Self::RenderRegion(_) => "render-region",
        }
    }

    /// Request passed to the registered command.
    pub fn request(&self) -> RenderRequest {
        match self {
            Self::Render(args) => RenderRequest {
                view: Extent2d::new(args.width, args.height),
                region: None,
                mode: if args.quiet {
                    RenderMode::Quiet
                } else {
                    RenderMode::Interactive
                },
                in_window: false,
                composite: false,
            },
            Self::RenderRegion(args) => RenderRequest {
                view: Extent2d::new(args.view_width, args.view_height),
                region: Some(PixelRect::new(args.x, args.y, args.width, args.height)),
                mode: RenderMode::Interactive,
                in_window: args.in_window,
                composite: args.composite,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "lumen", "--output", "out.png", "render", "--width", "4", "--height", "3", "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("out.png")));
        assert_eq!(cli.command.name(), "render");

        let request = cli.command.request();
        assert_eq!(request.view, Extent2d::new(4, 3));
        assert_eq!(request.mode, RenderMode::Quiet);
        assert!(request.region.is_none());
    }

    #[test]
    fn test_parse_render_region() {
        let cli = Cli::try_parse_from([
            "lumen",
            "render-region",
            "--view-width",
            "8",
            "--view-height",
            "8",
            "--x",
            "2",
            "--y",
            "3",
            "--width",
            "4",
            "--height",
            "1",
            "--composite",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));

        let request = cli.command.request();
        assert_eq!(request.region, Some(PixelRect::new(2, 3, 4, 1)));
        assert!(request.composite);
        assert!(!request.in_window);
    }

    #[test]
    fn test_region_requires_rectangle() {
        assert!(Cli::try_parse_from(["lumen", "render-region", "--x", "1"]).is_err());
    }
}
