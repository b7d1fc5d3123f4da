//! Host-side lookups the change queue resolves identifiers against.

use super::records::{EnvironmentId, EnvironmentRecord, MaterialId, MaterialRecord};

/// Read access to host document data that is referenced, not pushed.
///
/// Environment deltas and mesh instances only carry identifiers. The change
/// queue resolves them through this trait: environments when the delta
/// arrives, materials the first time they are needed.
///
/// Implementations must be callable from the ingestion thread and from the
/// render worker.
pub trait SceneSource: Send + Sync {
    /// Resolve an environment identifier.
    fn environment(&self, id: EnvironmentId) -> Option<EnvironmentRecord>;

    /// Resolve a material identifier.
    fn material(&self, id: MaterialId) -> Option<MaterialRecord>;
}

/// A source that resolves nothing.
///
/// Used for render sessions that have no host document attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySceneSource;

impl SceneSource for EmptySceneSource {
    fn environment(&self, _id: EnvironmentId) -> Option<EnvironmentRecord> {
        None
    }

    fn material(&self, _id: MaterialId) -> Option<MaterialRecord> {
        None
    }
}
