use orbitscene_common::SurfaceSize;
use orbitscene_render::{PerspectiveCamera, Renderer};

/// Keeps camera projection and output surface in step with the host
/// container's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    size: SurfaceSize,
}

impl Viewport {
    pub fn new(size: SurfaceSize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Apply a resize signal. Returns true if anything changed.
    ///
    /// Unchanged dimensions are a no-op, and so are empty ones (a minimized
    /// window keeps its last projection).
    pub fn resize<R: Renderer>(
        &mut self,
        size: SurfaceSize,
        camera: &mut PerspectiveCamera,
        renderer: &mut R,
    ) -> bool {
        if size.is_empty() {
            tracing::debug!(%size, "ignoring empty resize");
            return false;
        }
        if size == self.size {
            return false;
        }
        camera.set_aspect(size.aspect());
        renderer.resize(size);
        tracing::debug!(from = %self.size, to = %size, aspect = camera.aspect, "viewport resized");
        self.size = size;
        true
    }
}
