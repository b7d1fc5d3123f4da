//! TOML scene scripts.
//!
//! A scene script stands in for a live host document: it defines the
//! environments and materials deltas refer to, and lists the delta batches
//! the host would have reported, in arrival order.
//!
//! ```toml
//! [[environments]]
//! id = 1
//! name = "Studio"
//! color = [0.2, 0.2, 0.25, 1.0]
//!
//! [[materials]]
//! id = 10
//! name = "Red"
//! base_color = [1.0, 0.0, 0.0, 1.0]
//!
//! [[batches]]
//! kind = "view"
//! [batches.view]
//! camera_location = [0.0, -10.0, 2.0]
//! camera_direction = [0.0, 1.0, 0.0]
//!
//! [[batches]]
//! kind = "environment"
//! usage = "background"
//! id = 1
//!
//! [[batches]]
//! kind = "meshes"
//! [[batches.added]]
//! id = 1
//! [[batches.added.submeshes]]
//! vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
//! faces = [[0, 1, 2]]
//! ```

use std::path::Path;

use serde::Deserialize;

use lumen_graphics::SceneChangeQueue;
use lumen_graphics::scene::{
    EnvironmentId, EnvironmentRecord, EnvironmentUsage, InstanceId, LightRecord, MaterialRecord,
    MeshId, MeshInstanceRecord, MeshRecord, ViewState,
};

use crate::document::Document;
use crate::error::AppError;

/// One scripted delta batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneBatch {
    View {
        view: ViewState,
    },
    Environment {
        usage: EnvironmentUsage,
        #[serde(default)]
        id: Option<EnvironmentId>,
    },
    Lights {
        #[serde(default)]
        lights: Vec<LightRecord>,
    },
    Meshes {
        #[serde(default)]
        deleted: Vec<MeshId>,
        #[serde(default)]
        added: Vec<MeshRecord>,
    },
    Instances {
        #[serde(default)]
        deleted: Vec<InstanceId>,
        #[serde(default)]
        added: Vec<MeshInstanceRecord>,
    },
}

/// A parsed scene script.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneScript {
    pub environments: Vec<EnvironmentRecord>,
    pub materials: Vec<MaterialRecord>,
    pub batches: Vec<SceneBatch>,
}

impl SceneScript {
    /// Parse a script from TOML text.
    pub fn parse(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|err| AppError::io(path, err))?;
        let script = Self::parse(&text)?;
        log::info!(
            "Loaded scene script {} ({} batches)",
            path.display(),
            script.batches.len()
        );
        Ok(script)
    }

    /// Build the host document the batches reference.
    pub fn document(&self) -> Document {
        let mut document = Document::new();
        for environment in &self.environments {
            document.insert_environment(environment.clone());
        }
        for material in &self.materials {
            document.insert_material(material.clone());
        }
        document
    }

    /// Apply every batch to `queue` in order.
    ///
    /// Stops at the first rejected batch; batches before it stay applied.
    pub fn replay(&self, queue: &SceneChangeQueue) -> Result<(), AppError> {
        for (index, batch) in self.batches.iter().enumerate() {
            batch
                .apply(queue)
                .map_err(|source| AppError::Scene { batch: index, source })?;
        }
        log::debug!(
            "Replayed {} batches, scene version {}",
            self.batches.len(),
            queue.version()
        );
        Ok(())
    }
}

impl SceneBatch {
    /// Apply this batch to `queue`.
    pub fn apply(&self, queue: &SceneChangeQueue) -> Result<(), lumen_graphics::SceneError> {
        match self {
            Self::View { view } => {
                queue.apply_view_delta(*view);
                Ok(())
            }
            Self::Environment { usage, id } => {
                queue.apply_environment_delta(*usage, *id);
                Ok(())
            }
            Self::Lights { lights } => queue.apply_light_deltas(lights.clone()),
            Self::Meshes { deleted, added } => queue.apply_mesh_deltas(deleted, added.clone()),
            Self::Instances { deleted, added } => {
                queue.apply_mesh_instance_deltas(deleted, added.clone())
            }
        }
    }
}
