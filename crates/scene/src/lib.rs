//! Scene graph: the fixed set of animated primitives, the ground plane and
//! the lighting rig, all owned by a single root.
//!
//! # Invariants
//! - The root exclusively owns every node; children carry only their index.
//! - Object count is fixed at [`OBJECT_COUNT`].
//! - Lights are immutable once the scene is built.

pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;

pub use geometry::{Geometry, GeometryKind};
pub use light::{Light, LightKind, LightingRig, ShadowParams};
pub use material::Material;
pub use scene::{Fog, GroundPlane, OBJECT_COUNT, Scene, SceneObject};
