//! Scene ingestion errors.

use super::records::{InstanceId, LightId, MeshId};

/// Errors reported to the caller of a delta-application method.
///
/// A batch that fails leaves the snapshot untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// A camera-relative light arrived before any view.
    #[error("camera-relative light {light} arrived before any view state")]
    MissingViewState { light: LightId },
    /// A submesh face references a vertex that does not exist.
    #[error("mesh {mesh} submesh {submesh} is invalid: {reason}")]
    InvalidMesh {
        mesh: MeshId,
        submesh: usize,
        reason: String,
    },
    /// The same mesh identifier appears twice in one added list.
    #[error("mesh {0} appears more than once in a single batch")]
    DuplicateMesh(MeshId),
    /// The same instance identifier appears twice in one added-or-changed list.
    #[error("mesh instance {0} appears more than once in a single batch")]
    DuplicateInstance(InstanceId),
}
