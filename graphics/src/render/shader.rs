//! Pixel colour policies.
//!
//! The worker asks a [`PixelShader`] for the colour of every pixel it
//! writes. Lighting and material evaluation are out of scope here; the
//! shaders below paint placeholder colours so a real renderer can be
//! plugged in behind the same trait later.

use crate::error::RenderError;
use crate::scene::{EnvironmentUsage, SceneSnapshot};
use crate::types::Color4;

/// Computes the colour of one pixel.
///
/// Called from the render worker thread. `scene` is `None` for workers
/// without a change queue; otherwise it is the snapshot as of this pixel,
/// read-locked for the duration of the call.
pub trait PixelShader: Send + Sync {
    /// Colour of pixel `(x, y)` in target coordinates.
    fn shade(&self, x: u32, y: u32, scene: Option<&SceneSnapshot>) -> Result<Color4, RenderError>;
}

/// Paints every pixel with one colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidShader {
    pub color: Color4,
}

impl SolidShader {
    pub fn new(color: Color4) -> Self {
        Self { color }
    }
}

impl PixelShader for SolidShader {
    fn shade(&self, _x: u32, _y: u32, _scene: Option<&SceneSnapshot>) -> Result<Color4, RenderError> {
        Ok(self.color)
    }
}

/// Paints the background environment's colour, or a placeholder.
///
/// Without a scene, or with no background bound, this behaves like a
/// [`SolidShader`] of the placeholder colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneShader {
    pub placeholder: Color4,
}

impl SceneShader {
    pub fn new(placeholder: Color4) -> Self {
        Self { placeholder }
    }
}

impl PixelShader for SceneShader {
    fn shade(&self, _x: u32, _y: u32, scene: Option<&SceneSnapshot>) -> Result<Color4, RenderError> {
        let background = scene
            .and_then(|scene| scene.environment(EnvironmentUsage::Background))
            .map(|binding| binding.record.color);
        Ok(background.unwrap_or(self.placeholder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EnvironmentId, EnvironmentRecord, MaterialId, MaterialRecord};
    use crate::scene::{SceneChangeQueue, SceneSource};
    use std::sync::Arc;

    struct Studio;

    impl SceneSource for Studio {
        fn environment(&self, id: EnvironmentId) -> Option<EnvironmentRecord> {
            Some(EnvironmentRecord {
                id,
                name: "Studio".to_string(),
                color: Color4::new(0.1, 0.2, 0.3, 1.0),
            })
        }

        fn material(&self, _id: MaterialId) -> Option<MaterialRecord> {
            None
        }
    }

    #[test]
    fn scene_shader_falls_back_to_placeholder() {
        let shader = SceneShader::new(Color4::WHITE);
        assert_eq!(shader.shade(0, 0, None).unwrap(), Color4::WHITE);

        let empty = SceneChangeQueue::detached();
        assert_eq!(shader.shade(0, 0, Some(&empty.read())).unwrap(), Color4::WHITE);
    }

    #[test]
    fn scene_shader_uses_background() {
        let queue = SceneChangeQueue::new(Arc::new(Studio));
        queue.apply_environment_delta(EnvironmentUsage::Background, Some(EnvironmentId(3)));

        let shader = SceneShader::new(Color4::WHITE);
        assert_eq!(
            shader.shade(1, 1, Some(&queue.read())).unwrap(),
            Color4::new(0.1, 0.2, 0.3, 1.0)
        );
    }
}
