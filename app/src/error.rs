//! Application error types.

use std::path::PathBuf;

use lumen_graphics::SceneError;

/// Errors surfaced by the command-line host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A file could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A scene script or config file is not valid TOML for its schema.
    #[error("invalid script: {0}")]
    Script(#[from] toml::de::Error),
    /// A scripted delta batch was rejected.
    #[error("scene batch {batch} rejected: {source}")]
    Scene {
        batch: usize,
        #[source]
        source: SceneError,
    },
    /// The rendered image could not be written.
    #[error("image output failed: {0}")]
    Image(#[from] image::ImageError),
    /// No command is registered under this name.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

impl AppError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
