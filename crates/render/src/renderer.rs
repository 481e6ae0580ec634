use orbitscene_common::SurfaceSize;
use orbitscene_scene::Scene;
use std::fmt::Write;

use crate::camera::PerspectiveCamera;

/// Per-frame shading switches taken from the current settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingOptions {
    /// Draw the animated objects as wireframes.
    pub wireframe: bool,
    /// Multiplier applied to every light's intensity.
    pub light_scale: f32,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        Self {
            wireframe: false,
            light_scale: 1.0,
        }
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
    pub shading: ShadingOptions,
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by one draw call.
    type Output;

    /// Draw one frame.
    fn draw(&mut self, frame: &FrameView<'_>) -> Self::Output;

    /// Match the output surface to new pixel dimensions.
    fn resize(&mut self, size: SurfaceSize);

    /// Current output surface size.
    fn surface_size(&self) -> SurfaceSize;

    /// Release surface and GPU resources. Draws after release produce
    /// nothing useful.
    fn release(&mut self) {}
}

/// Debug text renderer.
///
/// Produces a human-readable description of the frame. Useful for CLI
/// output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    size: SurfaceSize,
    frames: u64,
    released: bool,
}

impl DebugTextRenderer {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Number of draw calls issued so far.
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn draw(&mut self, frame: &FrameView<'_>) -> String {
        if self.released {
            return String::new();
        }
        self.frames += 1;

        let scene = frame.scene;
        let cam = frame.camera;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}, background {}) ===",
            self.frames,
            self.size,
            scene.background()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.target.x,
            cam.target.y,
            cam.target.z,
            cam.fov_degrees,
            cam.aspect
        );
        let _ = writeln!(
            out,
            "Shading: wireframe={} light_scale={:.1}",
            frame.shading.wireframe, frame.shading.light_scale
        );
        let _ = writeln!(out, "Objects: {}", scene.object_count());
        for obj in scene.objects() {
            let p = obj.transform.position;
            let r = obj.transform.rotation;
            let _ = writeln!(
                out,
                "  [{}] {:<11} pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}, {:.3}) color={}",
                obj.index(),
                obj.kind().name(),
                p.x,
                p.y,
                p.z,
                r.x,
                r.y,
                r.z,
                obj.material().color()
            );
        }
        out
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_once(renderer: &mut DebugTextRenderer) -> String {
        let scene = Scene::build();
        let camera = PerspectiveCamera::for_surface(renderer.surface_size());
        renderer.draw(&FrameView {
            scene: &scene,
            camera: &camera,
            shading: ShadingOptions::default(),
        })
    }

    #[test]
    fn debug_renderer_lists_objects() {
        let mut renderer = DebugTextRenderer::new(SurfaceSize::new(800, 600));
        let output = draw_once(&mut renderer);

        assert!(output.contains("Objects: 5"));
        assert!(output.contains("icosahedron"));
        assert!(output.contains("800x600"));
        assert!(output.contains("aspect=1.333"));
        assert_eq!(renderer.frames_drawn(), 1);
    }

    #[test]
    fn released_renderer_draws_nothing() {
        let mut renderer = DebugTextRenderer::new(SurfaceSize::new(320, 240));
        renderer.release();
        assert!(draw_once(&mut renderer).is_empty());
        assert_eq!(renderer.frames_drawn(), 0);
        assert!(renderer.is_released());
    }

    #[test]
    fn shading_options_default() {
        let opts = ShadingOptions::default();
        assert!(!opts.wireframe);
        assert_eq!(opts.light_scale, 1.0);
    }
}
