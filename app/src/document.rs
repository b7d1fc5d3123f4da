//! In-memory host document.

use std::collections::BTreeMap;

use lumen_graphics::scene::{
    EnvironmentId, EnvironmentRecord, MaterialId, MaterialRecord, SceneSource,
};

/// Environments and materials a scene script defines up front.
///
/// Deltas only reference these by identifier; the change queue resolves
/// them through [`SceneSource`].
#[derive(Debug, Clone, Default)]
pub struct Document {
    environments: BTreeMap<EnvironmentId, EnvironmentRecord>,
    materials: BTreeMap<MaterialId, MaterialRecord>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an environment.
    pub fn insert_environment(&mut self, environment: EnvironmentRecord) {
        self.environments.insert(environment.id, environment);
    }

    /// Add or replace a material.
    pub fn insert_material(&mut self, material: MaterialRecord) {
        self.materials.insert(material.id, material);
    }

    pub fn environment_count(&self) -> usize {
        self.environments.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl SceneSource for Document {
    fn environment(&self, id: EnvironmentId) -> Option<EnvironmentRecord> {
        self.environments.get(&id).cloned()
    }

    fn material(&self, id: MaterialId) -> Option<MaterialRecord> {
        self.materials.get(&id).cloned()
    }
}
