//! Scene records delivered by the host document.
//!
//! These types carry the payloads of the host's change notifications. They
//! are plain data: the [`SceneChangeQueue`](super::SceneChangeQueue) decides
//! how each record merges into the [`SceneSnapshot`](super::SceneSnapshot).

use std::fmt;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::types::{Color4, ScreenRect};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(
    /// Identifier of a light in the host document.
    LightId(u64)
);
record_id!(
    /// Identifier of the object owning a mesh.
    MeshId(u64)
);
record_id!(
    /// Identifier of a mesh instance.
    InstanceId(u32)
);
record_id!(
    /// Identifier of a material.
    MaterialId(u64)
);
record_id!(
    /// Identifier of an environment.
    EnvironmentId(u64)
);

// ============================================================================
// View
// ============================================================================

/// Orthonormal camera frame in world space.
///
/// `z` points from the scene back towards the camera, so the view direction
/// is `-z`. `x` is screen right and `y` is screen up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub origin: Vec3,
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl CameraFrame {
    /// Transform a camera-space point to world space.
    pub fn point_to_world(&self, point: Vec3) -> Vec3 {
        self.origin + self.vector_to_world(point)
    }

    /// Transform a camera-space direction to world space.
    pub fn vector_to_world(&self, vector: Vec3) -> Vec3 {
        self.x * vector.x + self.y * vector.y + self.z * vector.z
    }
}

/// Camera and screen state of the view being rendered.
///
/// Replaced wholesale on every view delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Camera location in world space.
    pub camera_location: Vec3,
    /// Viewing direction in world space (need not be normalized).
    pub camera_direction: Vec3,
    /// Approximate up vector used to orient the camera frame.
    #[serde(default = "default_camera_up")]
    pub camera_up: Vec3,
    /// Near clip distance.
    #[serde(default = "default_near")]
    pub near: f32,
    /// Far clip distance.
    #[serde(default = "default_far")]
    pub far: f32,
    /// Screen viewport rectangle.
    #[serde(default)]
    pub screen_port: ScreenRect,
}

fn default_camera_up() -> Vec3 {
    Vec3::Z
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

impl ViewState {
    /// Create a view looking along `direction` from `location`, Z-up.
    pub fn new(location: Vec3, direction: Vec3) -> Self {
        Self {
            camera_location: location,
            camera_direction: direction,
            camera_up: default_camera_up(),
            near: default_near(),
            far: default_far(),
            screen_port: ScreenRect::default(),
        }
    }

    /// Set the up vector.
    #[must_use]
    pub fn with_up(mut self, up: Vec3) -> Self {
        self.camera_up = up;
        self
    }

    /// Set the near and far clip distances.
    #[must_use]
    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Set the screen viewport rectangle.
    #[must_use]
    pub fn with_screen_port(mut self, screen_port: ScreenRect) -> Self {
        self.screen_port = screen_port;
        self
    }

    /// Build the orthonormal camera frame for this view.
    ///
    /// A zero direction looks down `-Z`; an up vector parallel to the
    /// direction is replaced by an arbitrary perpendicular one.
    pub fn camera_frame(&self) -> CameraFrame {
        let forward = self
            .camera_direction
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z);
        let right = forward
            .cross(self.camera_up)
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector());
        let up = right.cross(forward);
        CameraFrame {
            origin: self.camera_location,
            x: right,
            y: up,
            z: -forward,
        }
    }
}

// ============================================================================
// Environments
// ============================================================================

/// Slot an environment is assigned to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentUsage {
    Background,
    Skylight,
    Reflection,
}

impl EnvironmentUsage {
    /// All usages, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Background, Self::Skylight, Self::Reflection];
}

impl fmt::Display for EnvironmentUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Background => "background",
            Self::Skylight => "skylight",
            Self::Reflection => "reflection",
        };
        f.write_str(name)
    }
}

/// Environment data resolved from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub id: EnvironmentId,
    pub name: String,
    /// Uniform color of the environment.
    pub color: Color4,
}

/// An environment assigned to a usage slot.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentBinding {
    pub usage: EnvironmentUsage,
    pub record: EnvironmentRecord,
}

// ============================================================================
// Lights
// ============================================================================

/// What happened to a record in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    #[default]
    Added,
    Modified,
    Removed,
}

/// Light style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightStyle {
    #[default]
    Point,
    Directional,
    Spot,
    /// Directional light attached to the camera.
    CameraRelative,
}

/// Space a light's location and direction are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    #[default]
    World,
    Camera,
}

/// A light change delivered by the host.
///
/// When `space` is omitted on deserialization it follows the style:
/// camera-relative lights are read in camera space, all others in world
/// space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LightFields")]
pub struct LightRecord {
    pub id: LightId,
    pub name: String,
    pub change: ChangeKind,
    pub style: LightStyle,
    /// Space of `location` and `direction`.
    pub space: CoordinateSpace,
    pub location: Vec3,
    pub direction: Vec3,
    pub color: Color4,
    pub intensity: f32,
}

#[derive(Deserialize)]
struct LightFields {
    id: LightId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    change: ChangeKind,
    #[serde(default)]
    style: LightStyle,
    #[serde(default)]
    space: Option<CoordinateSpace>,
    #[serde(default)]
    location: Vec3,
    #[serde(default = "default_light_direction")]
    direction: Vec3,
    #[serde(default = "default_light_color")]
    color: Color4,
    #[serde(default = "default_light_intensity")]
    intensity: f32,
}

impl From<LightFields> for LightRecord {
    fn from(fields: LightFields) -> Self {
        Self {
            id: fields.id,
            name: fields.name,
            change: fields.change,
            style: fields.style,
            space: fields
                .space
                .unwrap_or_else(|| CoordinateSpace::for_style(fields.style)),
            location: fields.location,
            direction: fields.direction,
            color: fields.color,
            intensity: fields.intensity,
        }
    }
}

impl CoordinateSpace {
    /// Space a light of `style` is reported in by default.
    pub fn for_style(style: LightStyle) -> Self {
        match style {
            LightStyle::CameraRelative => Self::Camera,
            _ => Self::World,
        }
    }
}

fn default_light_direction() -> Vec3 {
    Vec3::NEG_Z
}

fn default_light_color() -> Color4 {
    Color4::WHITE
}

fn default_light_intensity() -> f32 {
    1.0
}

impl LightRecord {
    /// Create an added light. Camera-relative lights start in camera space.
    pub fn new(id: LightId, style: LightStyle) -> Self {
        Self {
            id,
            name: String::new(),
            change: ChangeKind::Added,
            style,
            space: CoordinateSpace::for_style(style),
            location: Vec3::ZERO,
            direction: default_light_direction(),
            color: default_light_color(),
            intensity: default_light_intensity(),
        }
    }

    /// Set the light name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the change kind.
    #[must_use]
    pub fn with_change(mut self, change: ChangeKind) -> Self {
        self.change = change;
        self
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    /// Set the direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    /// Set the color and intensity.
    #[must_use]
    pub fn with_color(mut self, color: Color4, intensity: f32) -> Self {
        self.color = color;
        self.intensity = intensity;
        self
    }

    /// Returns `true` if the light still carries camera-space coordinates.
    pub fn needs_world_conversion(&self) -> bool {
        self.style == LightStyle::CameraRelative && self.space == CoordinateSpace::Camera
    }

    /// Returns this light expressed in world space under `view`.
    ///
    /// Lights already in world space are returned unchanged.
    pub fn to_world(&self, view: &ViewState) -> Self {
        if self.space == CoordinateSpace::World {
            return self.clone();
        }
        let frame = view.camera_frame();
        Self {
            space: CoordinateSpace::World,
            location: frame.point_to_world(self.location),
            direction: frame.vector_to_world(self.direction),
            ..self.clone()
        }
    }
}

// ============================================================================
// Meshes
// ============================================================================

/// Mesh face referencing vertices of its submesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Face {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl Face {
    /// Vertex indices of this face.
    pub fn indices(&self) -> &[u32] {
        match self {
            Self::Triangle(indices) => indices,
            Self::Quad(indices) => indices,
        }
    }

    /// Returns `true` for quads.
    pub fn is_quad(&self) -> bool {
        matches!(self, Self::Quad(_))
    }
}

/// A single submesh: vertices and the faces built from them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubMesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl SubMesh {
    /// Create a submesh.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Number of quad faces.
    pub fn quad_count(&self) -> usize {
        self.faces.iter().filter(|face| face.is_quad()).count()
    }

    /// Returns the first face index that references a missing vertex.
    pub fn first_invalid_face(&self) -> Option<usize> {
        let vertex_count = self.vertices.len();
        self.faces.iter().position(|face| {
            face.indices()
                .iter()
                .any(|&index| index as usize >= vertex_count)
        })
    }
}

/// Vertex, face and quad totals of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshStats {
    pub submeshes: usize,
    pub vertices: usize,
    pub faces: usize,
    pub quads: usize,
}

/// All submeshes owned by one document object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    pub id: MeshId,
    #[serde(default)]
    pub submeshes: Vec<SubMesh>,
}

impl MeshRecord {
    /// Create a mesh record.
    pub fn new(id: MeshId, submeshes: Vec<SubMesh>) -> Self {
        Self { id, submeshes }
    }

    /// Sum vertex, face and quad counts over all submeshes.
    pub fn stats(&self) -> MeshStats {
        self.submeshes
            .iter()
            .fold(
                MeshStats {
                    submeshes: self.submeshes.len(),
                    ..MeshStats::default()
                },
                |mut stats, submesh| {
                    stats.vertices += submesh.vertices.len();
                    stats.faces += submesh.faces.len();
                    stats.quads += submesh.quad_count();
                    stats
                },
            )
    }
}

// ============================================================================
// Instances and materials
// ============================================================================

/// Placement of one submesh in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshInstanceRecord {
    pub instance_id: InstanceId,
    pub mesh_id: MeshId,
    #[serde(default)]
    pub submesh_index: usize,
    pub material_id: MaterialId,
    #[serde(default = "default_transform")]
    pub transform: Mat4,
}

fn default_transform() -> Mat4 {
    Mat4::IDENTITY
}

impl MeshInstanceRecord {
    /// Create an instance with identity transform.
    pub fn new(
        instance_id: InstanceId,
        mesh_id: MeshId,
        submesh_index: usize,
        material_id: MaterialId,
    ) -> Self {
        Self {
            instance_id,
            mesh_id,
            submesh_index,
            material_id,
            transform: default_transform(),
        }
    }

    /// Set the instance transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}

/// Material data resolved from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub id: MaterialId,
    pub name: String,
    pub base_color: Color4,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a:?} != {b:?}");
    }

    #[test]
    fn camera_frame_is_right_handed() {
        let view = ViewState::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 1.0, 0.0));
        let frame = view.camera_frame();
        assert_vec3_near(frame.x, Vec3::X);
        assert_vec3_near(frame.y, Vec3::Z);
        assert_vec3_near(frame.z, Vec3::NEG_Y);
        assert_vec3_near(frame.x.cross(frame.y), frame.z);
    }

    #[test]
    fn camera_frame_handles_parallel_up() {
        let view = ViewState::new(Vec3::ZERO, Vec3::Z);
        let frame = view.camera_frame();
        assert!(frame.x.is_normalized());
        assert!(frame.y.is_normalized());
        assert!(frame.x.dot(frame.z).abs() < 1e-5);
        assert_vec3_near(frame.z, Vec3::NEG_Z);
    }

    #[test]
    fn camera_relative_light_converts_to_world() {
        let view = ViewState::new(Vec3::new(0.0, -10.0, 0.0), Vec3::Y);
        let light = LightRecord::new(LightId(1), LightStyle::CameraRelative)
            .with_location(Vec3::new(1.0, 0.0, 0.0))
            .with_direction(Vec3::NEG_Z);

        let world = light.to_world(&view);
        assert_eq!(world.space, CoordinateSpace::World);
        assert_vec3_near(world.location, Vec3::new(1.0, -10.0, 0.0));
        assert_vec3_near(world.direction, Vec3::Y);
        assert!(!world.needs_world_conversion());
    }

    #[test]
    fn world_light_is_unchanged_by_conversion() {
        let view = ViewState::new(Vec3::new(5.0, 5.0, 5.0), Vec3::X);
        let light = LightRecord::new(LightId(2), LightStyle::Spot)
            .with_location(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(light.to_world(&view), light);
    }

    #[test]
    fn omitted_space_follows_style() {
        let fields = |style, space| LightFields {
            id: LightId(3),
            name: String::new(),
            change: ChangeKind::Added,
            style,
            space,
            location: Vec3::X,
            direction: default_light_direction(),
            color: default_light_color(),
            intensity: default_light_intensity(),
        };

        let camera = LightRecord::from(fields(LightStyle::CameraRelative, None));
        assert_eq!(camera.space, CoordinateSpace::Camera);
        assert!(camera.needs_world_conversion());

        let point = LightRecord::from(fields(LightStyle::Point, None));
        assert_eq!(point.space, CoordinateSpace::World);

        let explicit = LightRecord::from(fields(
            LightStyle::CameraRelative,
            Some(CoordinateSpace::World),
        ));
        assert_eq!(explicit.space, CoordinateSpace::World);
    }

    #[test]
    fn mesh_stats_count_quads() {
        let quad = SubMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::Y],
            vec![Face::Quad([0, 1, 2, 3])],
        );
        let tris = SubMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Face::Triangle([0, 1, 2]), Face::Triangle([2, 1, 0])],
        );
        let stats = MeshRecord::new(MeshId(7), vec![quad, tris]).stats();
        assert_eq!(
            stats,
            MeshStats {
                submeshes: 2,
                vertices: 7,
                faces: 3,
                quads: 1,
            }
        );
    }

    #[test]
    fn submesh_detects_out_of_range_faces() {
        let submesh = SubMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Face::Triangle([0, 1, 2]), Face::Triangle([0, 1, 3])],
        );
        assert_eq!(submesh.first_invalid_face(), Some(1));
    }
}
