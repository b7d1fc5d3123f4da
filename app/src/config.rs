//! TOML configuration file.

use std::path::Path;

use serde::Deserialize;

use lumen_graphics::RenderSettings;

use crate::error::AppError;

/// Contents of a `--config` file.
///
/// ```toml
/// [render]
/// placeholder_color = [0.0, 0.0, 0.0, 1.0]
/// poll_interval_ms = 10
///
/// [render.pixel_pacing]
/// interval = 64
/// sleep_us = 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderSettings,
}

impl AppConfig {
    pub fn parse(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|err| AppError::io(path, err))?;
        let config = Self::parse(&text)?;
        log::info!("Loaded config {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_graphics::{Color4, PixelPacing};

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_render_table() {
        let config = AppConfig::parse(
            r#"
[render]
placeholder_color = [0.0, 0.0, 0.0, 1.0]
done_label = "finished"

[render.pixel_pacing]
interval = 0
"#,
        )
        .unwrap();

        assert_eq!(config.render.placeholder_color, Color4::BLACK);
        assert_eq!(config.render.done_label, "finished");
        assert_eq!(config.render.pixel_pacing, PixelPacing::NONE);
        assert_eq!(config.render.progress_label, "rendering...");
    }
}
