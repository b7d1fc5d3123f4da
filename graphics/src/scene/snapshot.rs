//! SceneSnapshot holds the renderable scene assembled from host deltas.
//!
//! The snapshot is the render worker's consistent view of the document. It
//! is created empty when synchronization begins, mutated only by the
//! [`SceneChangeQueue`](super::SceneChangeQueue) one whole batch at a time,
//! and dropped with the render session.

use std::collections::BTreeMap;

use super::records::{
    EnvironmentBinding, EnvironmentUsage, InstanceId, LightId, LightRecord, MaterialId,
    MaterialRecord, MeshId, MeshInstanceRecord, MeshRecord, ViewState,
};

/// A snapshot of render-relevant scene data.
///
/// All record maps are ordered by identifier so iteration is deterministic
/// and two snapshots with the same net content compare equal through
/// [`contents_eq`](Self::contents_eq).
///
/// # Usage
///
/// ```ignore
/// let snapshot = queue.read();
/// for instance in snapshot.instances() {
///     let mesh = snapshot.mesh(instance.mesh_id);
///     let material = snapshot.material(instance.material_id);
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    /// Logical version, bumped once per applied delta batch.
    version: u64,
    view: Option<ViewState>,
    environments: BTreeMap<EnvironmentUsage, EnvironmentBinding>,
    lights: BTreeMap<LightId, LightRecord>,
    meshes: BTreeMap<MeshId, MeshRecord>,
    instances: BTreeMap<InstanceId, MeshInstanceRecord>,
    /// Materials resolved so far. Filled lazily, never part of a delta.
    materials: BTreeMap<MaterialId, MaterialRecord>,
}

impl SceneSnapshot {
    /// Creates a new empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the logical version (number of applied batches).
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the current view, if one has been supplied.
    #[inline]
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    /// Returns the environment bound to `usage`.
    pub fn environment(&self, usage: EnvironmentUsage) -> Option<&EnvironmentBinding> {
        self.environments.get(&usage)
    }

    /// Returns a light by identifier.
    pub fn light(&self, id: LightId) -> Option<&LightRecord> {
        self.lights.get(&id)
    }

    /// Iterates over all lights in identifier order.
    pub fn lights(&self) -> impl Iterator<Item = &LightRecord> {
        self.lights.values()
    }

    /// Returns a mesh by identifier.
    pub fn mesh(&self, id: MeshId) -> Option<&MeshRecord> {
        self.meshes.get(&id)
    }

    /// Iterates over all meshes in identifier order.
    pub fn meshes(&self) -> impl Iterator<Item = &MeshRecord> {
        self.meshes.values()
    }

    /// Returns an instance by identifier.
    pub fn instance(&self, id: InstanceId) -> Option<&MeshInstanceRecord> {
        self.instances.get(&id)
    }

    /// Iterates over all instances in identifier order.
    pub fn instances(&self) -> impl Iterator<Item = &MeshInstanceRecord> {
        self.instances.values()
    }

    /// Returns a resolved material by identifier.
    pub fn material(&self, id: MaterialId) -> Option<&MaterialRecord> {
        self.materials.get(&id)
    }

    /// Returns counts of lights, meshes and instances.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.lights.len(), self.meshes.len(), self.instances.len())
    }

    /// Returns `true` if no view, environment, light, mesh or instance is present.
    pub fn is_empty(&self) -> bool {
        self.view.is_none()
            && self.environments.is_empty()
            && self.lights.is_empty()
            && self.meshes.is_empty()
            && self.instances.is_empty()
    }

    /// Compares scene content, ignoring the version and the material cache.
    pub fn contents_eq(&self, other: &Self) -> bool {
        self.view == other.view
            && self.environments == other.environments
            && self.lights == other.lights
            && self.meshes == other.meshes
            && self.instances == other.instances
    }

    // ------------------------------------------------------------------
    // Mutation, reserved for the change queue
    // ------------------------------------------------------------------

    pub(super) fn bump_version(&mut self) {
        self.version += 1;
    }

    pub(super) fn set_view(&mut self, view: ViewState) {
        self.view = Some(view);
    }

    pub(super) fn bind_environment(&mut self, binding: EnvironmentBinding) {
        self.environments.insert(binding.usage, binding);
    }

    pub(super) fn unbind_environment(&mut self, usage: EnvironmentUsage) {
        self.environments.remove(&usage);
    }

    pub(super) fn upsert_light(&mut self, light: LightRecord) {
        self.lights.insert(light.id, light);
    }

    pub(super) fn remove_light(&mut self, id: LightId) -> Option<LightRecord> {
        self.lights.remove(&id)
    }

    pub(super) fn upsert_mesh(&mut self, mesh: MeshRecord) {
        self.meshes.insert(mesh.id, mesh);
    }

    pub(super) fn remove_mesh(&mut self, id: MeshId) -> Option<MeshRecord> {
        self.meshes.remove(&id)
    }

    pub(super) fn upsert_instance(&mut self, instance: MeshInstanceRecord) {
        self.instances.insert(instance.instance_id, instance);
    }

    pub(super) fn remove_instance(&mut self, id: InstanceId) -> Option<MeshInstanceRecord> {
        self.instances.remove(&id)
    }

    pub(super) fn cache_material(&mut self, material: MaterialRecord) {
        self.materials.insert(material.id, material);
    }

    pub(super) fn has_material(&self, id: MaterialId) -> bool {
        self.materials.contains_key(&id)
    }
}
