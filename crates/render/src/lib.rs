//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - One [`Renderer::draw`] call is one draw of the whole scene.
//!
//! Also home to the perspective camera and the procedural meshes, which are
//! plain CPU data shared by every backend.

mod camera;
pub mod mesh;
mod renderer;

pub use camera::PerspectiveCamera;
pub use mesh::MeshData;
pub use renderer::{DebugTextRenderer, FrameView, Renderer, ShadingOptions};
