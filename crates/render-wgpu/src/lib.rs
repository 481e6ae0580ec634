//! wgpu render backend for the orbit scene.
//!
//! Draws the five objects and the ground with Phong lighting, a shadow map
//! from the key light and linear fog. Wireframe mode swaps the objects to
//! edge line lists.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - One draw produces at most one acquired frame; the host presents it.

mod gpu;
mod shaders;
mod surface;

pub use surface::{GpuError, PresentableFrame, WgpuRenderer};
