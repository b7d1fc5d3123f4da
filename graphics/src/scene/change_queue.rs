//! SceneChangeQueue ingests host deltas into a shared scene snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use super::error::SceneError;
use super::records::{
    ChangeKind, EnvironmentBinding, EnvironmentId, EnvironmentRecord, EnvironmentUsage,
    InstanceId, LightRecord, MaterialId, MaterialRecord, MeshId, MeshInstanceRecord, MeshRecord, ViewState,
};
use super::snapshot::SceneSnapshot;
use super::source::{EmptySceneSource, SceneSource};

/// Read guard over the current snapshot.
///
/// Holding it blocks delta application, so keep it short-lived.
pub type SnapshotGuard<'a> = RwLockReadGuard<'a, SceneSnapshot>;

/// Ingests scene deltas and exposes a consistent snapshot to the renderer.
///
/// Every `apply_*` method validates its whole batch first and then applies
/// it inside a single exclusive section. A reader on another thread sees
/// either none or all of a batch. Each applied batch bumps the snapshot
/// version by one; a rejected batch changes nothing.
///
/// # Thread Safety
///
/// `SceneChangeQueue` is `Send + Sync`. Share it with the render worker via
/// `Arc` and keep calling `apply_*` from the host's notification thread.
///
/// # Example
///
/// ```ignore
/// let queue = Arc::new(SceneChangeQueue::new(document.clone()));
/// queue.apply_view_delta(view);
/// queue.apply_light_deltas(lights)?;
/// queue.apply_mesh_deltas(&[], meshes)?;
/// queue.apply_mesh_instance_deltas(&[], instances)?;
/// ```
pub struct SceneChangeQueue {
    source: Arc<dyn SceneSource>,
    snapshot: RwLock<SceneSnapshot>,
}

impl SceneChangeQueue {
    /// Creates a queue resolving identifiers through `source`.
    pub fn new(source: Arc<dyn SceneSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(SceneSnapshot::new()),
        }
    }

    /// Creates a queue with no host document behind it.
    pub fn detached() -> Self {
        Self::new(Arc::new(EmptySceneSource))
    }

    // ------------------------------------------------------------------
    // Delta application
    // ------------------------------------------------------------------

    /// Replaces the view wholesale.
    pub fn apply_view_delta(&self, view: ViewState) {
        log::debug!(
            "Camera @ {}, direction {}",
            view.camera_location,
            view.camera_direction
        );
        log::debug!(
            "    near {} far {}, screen port {}",
            view.near,
            view.far,
            view.screen_port
        );

        let mut snapshot = self.snapshot.write();
        snapshot.set_view(view);
        snapshot.bump_version();
    }

    /// Assigns (or clears, with `None`) the environment for `usage`.
    ///
    /// The identifier is resolved against the host right away. An
    /// identifier the host does not know leaves the usage unbound.
    pub fn apply_environment_delta(&self, usage: EnvironmentUsage, id: Option<EnvironmentId>) {
        let resolved = id.and_then(|id| {
            let record = self.source.environment(id);
            if record.is_none() {
                log::warn!("Environment {id} for {usage} could not be resolved");
            }
            record
        });

        match &resolved {
            Some(record) => log::debug!("{usage}: {}", record.name),
            None => log::debug!("No environment for {usage}"),
        }

        let mut snapshot = self.snapshot.write();
        match resolved {
            Some(record) => snapshot.bind_environment(EnvironmentBinding { usage, record }),
            None => snapshot.unbind_environment(usage),
        }
        snapshot.bump_version();
    }

    /// Applies an ordered sequence of light changes.
    ///
    /// Camera-relative lights are converted to world space with the view
    /// in effect right now. If such a light is added or modified before any
    /// view, the whole batch is rejected with
    /// [`SceneError::MissingViewState`]. Removals need no view.
    pub fn apply_light_deltas(&self, lights: Vec<LightRecord>) -> Result<(), SceneError> {
        let mut snapshot = self.snapshot.write();

        let view = snapshot.view().copied();
        if view.is_none()
            && let Some(light) = lights
                .iter()
                .find(|light| {
                    light.change != ChangeKind::Removed && light.needs_world_conversion()
                })
        {
            log::warn!(
                "Rejecting light batch: camera-relative light {} arrived before any view",
                light.id
            );
            return Err(SceneError::MissingViewState { light: light.id });
        }

        for light in lights {
            log::debug!(
                "A {:?} light {} '{}', {:?}",
                light.change,
                light.id,
                light.name,
                light.style
            );
            match light.change {
                ChangeKind::Removed => {
                    if snapshot.remove_light(light.id).is_none() {
                        log::debug!("    light {} was not present", light.id);
                    }
                }
                ChangeKind::Added | ChangeKind::Modified => {
                    let light = match &view {
                        Some(view) if light.needs_world_conversion() => {
                            let world = light.to_world(view);
                            log::debug!(
                                "    camera location {}, direction {} -> world location {}, direction {}",
                                light.location,
                                light.direction,
                                world.location,
                                world.direction
                            );
                            world
                        }
                        _ => light,
                    };
                    snapshot.upsert_light(light);
                }
            }
        }

        snapshot.bump_version();
        Ok(())
    }

    /// Removes `deleted` meshes, then inserts or replaces `added` ones.
    ///
    /// Deleting an identifier removes all of its submeshes. The batch is
    /// rejected if any added mesh has a face referencing a missing vertex
    /// or if an identifier appears twice in `added`.
    pub fn apply_mesh_deltas(
        &self,
        deleted: &[MeshId],
        added: Vec<MeshRecord>,
    ) -> Result<(), SceneError> {
        validate_meshes(&added)?;

        log::debug!(
            "Received {} new meshes, {} for deletion",
            added.len(),
            deleted.len()
        );
        for mesh in &added {
            log_mesh(mesh);
        }

        let mut snapshot = self.snapshot.write();
        for &id in deleted {
            if snapshot.remove_mesh(id).is_none() {
                log::debug!("    mesh {id} was not present");
            }
        }
        for mesh in added {
            snapshot.upsert_mesh(mesh);
        }
        snapshot.bump_version();
        Ok(())
    }

    /// Removes `deleted` instances, then inserts or updates `added_or_changed`.
    ///
    /// Deletions are applied first, so an identifier present in both lists
    /// ends up present with its new record. Materials referenced by the
    /// incoming instances are resolved and cached if not already known.
    pub fn apply_mesh_instance_deltas(
        &self,
        deleted: &[InstanceId],
        added_or_changed: Vec<MeshInstanceRecord>,
    ) -> Result<(), SceneError> {
        let mut seen = HashSet::with_capacity(added_or_changed.len());
        for instance in &added_or_changed {
            if !seen.insert(instance.instance_id) {
                return Err(SceneError::DuplicateInstance(instance.instance_id));
            }
        }

        log::debug!(
            "Received {} mesh instances to be added or changed, {} for deletion",
            added_or_changed.len(),
            deleted.len()
        );

        // Resolve outside the write lock; host lookups may be slow.
        let missing: Vec<MaterialId> = {
            let snapshot = self.snapshot.read();
            let mut ids: Vec<MaterialId> = added_or_changed
                .iter()
                .map(|instance| instance.material_id)
                .filter(|&id| !snapshot.has_material(id))
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let resolved: Vec<MaterialRecord> = missing
            .into_iter()
            .filter_map(|id| {
                let material = self.source.material(id);
                if material.is_none() {
                    log::warn!("Material {id} could not be resolved");
                }
                material
            })
            .collect();

        let mut snapshot = self.snapshot.write();
        for material in resolved {
            snapshot.cache_material(material);
        }
        for &id in deleted {
            snapshot.remove_instance(id);
        }
        for instance in added_or_changed {
            log::debug!(
                "    instance {} uses mesh <{}, {}> and material {} ({})",
                instance.instance_id,
                instance.mesh_id,
                instance.submesh_index,
                instance.material_id,
                snapshot
                    .material(instance.material_id)
                    .map_or("unresolved", |material| material.name.as_str())
            );
            snapshot.upsert_instance(instance);
        }
        snapshot.bump_version();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Returns the environment bound to `usage`.
    pub fn environment_for(&self, usage: EnvironmentUsage) -> Option<EnvironmentRecord> {
        self.snapshot
            .read()
            .environment(usage)
            .map(|binding| binding.record.clone())
    }

    /// Returns a material, resolving it through the host on first use.
    pub fn material_for(&self, id: MaterialId) -> Option<MaterialRecord> {
        if let Some(material) = self.snapshot.read().material(id) {
            return Some(material.clone());
        }
        let material = self.source.material(id)?;
        self.snapshot.write().cache_material(material.clone());
        Some(material)
    }

    /// Returns a mesh by identifier.
    pub fn mesh_for(&self, id: MeshId) -> Option<MeshRecord> {
        self.snapshot.read().mesh(id).cloned()
    }

    /// Returns the current view.
    pub fn view(&self) -> Option<ViewState> {
        self.snapshot.read().view().copied()
    }

    /// Returns the current logical version.
    pub fn version(&self) -> u64 {
        self.snapshot.read().version()
    }

    /// Locks the snapshot for reading.
    pub fn read(&self) -> SnapshotGuard<'_> {
        self.snapshot.read()
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> SceneSnapshot {
        self.snapshot.read().clone()
    }
}

impl Default for SceneChangeQueue {
    fn default() -> Self {
        Self::detached()
    }
}

impl std::fmt::Debug for SceneChangeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.read();
        let (lights, meshes, instances) = snapshot.counts();
        f.debug_struct("SceneChangeQueue")
            .field("version", &snapshot.version())
            .field("lights", &lights)
            .field("meshes", &meshes)
            .field("instances", &instances)
            .finish()
    }
}

fn validate_meshes(meshes: &[MeshRecord]) -> Result<(), SceneError> {
    let mut seen = HashSet::with_capacity(meshes.len());
    for mesh in meshes {
        if !seen.insert(mesh.id) {
            return Err(SceneError::DuplicateMesh(mesh.id));
        }
        for (index, submesh) in mesh.submeshes.iter().enumerate() {
            if let Some(face) = submesh.first_invalid_face() {
                return Err(SceneError::InvalidMesh {
                    mesh: mesh.id,
                    submesh: index,
                    reason: format!(
                        "face {face} references a vertex beyond {}",
                        submesh.vertices.len()
                    ),
                });
            }
        }
    }
    Ok(())
}

fn log_mesh(mesh: &MeshRecord) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("    {} with {} submeshes", mesh.id, mesh.submeshes.len());
    for (index, submesh) in mesh.submeshes.iter().enumerate() {
        log::debug!(
            "        submesh {index}: {} verts, {} faces ({} quads), material key ({}, {index})",
            submesh.vertices.len(),
            submesh.faces.len(),
            submesh.quad_count(),
            mesh.id
        );
    }
    let stats = mesh.stats();
    log::debug!(
        "    {} verts, {} faces (of which {} quads)",
        stats.vertices,
        stats.faces,
        stats.quads
    );
}
