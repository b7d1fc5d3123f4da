//! Scene synchronization between a host document and the render worker.
//!
//! The host reports changes to its document as delta batches. This module
//! turns that stream into a consistent snapshot the worker can read:
//!
//! - [`SceneChangeQueue`] - applies view, environment, light, mesh and
//!   mesh-instance deltas, one exclusive section per batch
//! - [`SceneSnapshot`] - the assembled, versioned scene
//! - [`SceneSource`] - host lookups for identifiers deltas only reference
//! - Records ([`ViewState`], [`LightRecord`], [`MeshRecord`], ...) - delta payloads
//!
//! # Batch rules
//!
//! | Delta | Merge rule |
//! |-------|------------|
//! | View | Replaced wholesale |
//! | Environment | One binding per usage; `None` or unknown id unbinds |
//! | Lights | Applied in order; camera-relative lights converted to world space |
//! | Meshes | Deletions by id, then additions replace |
//! | Instances | Deletions by id, then additions update (update wins) |
//!
//! A batch that fails validation changes nothing, not even the version.

mod change_queue;
mod error;
mod records;
mod snapshot;
mod source;

pub use change_queue::{SceneChangeQueue, SnapshotGuard};
pub use error::SceneError;
pub use records::{
    CameraFrame, ChangeKind, CoordinateSpace, EnvironmentBinding, EnvironmentId,
    EnvironmentRecord, EnvironmentUsage, Face, InstanceId, LightId, LightRecord, LightStyle,
    MaterialId, MaterialRecord, MeshId, MeshInstanceRecord, MeshRecord, MeshStats, SubMesh,
    ViewState,
};
pub use snapshot::SceneSnapshot;
pub use source::{EmptySceneSource, SceneSource};
