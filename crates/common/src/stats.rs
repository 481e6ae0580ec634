use serde::{Deserialize, Serialize};

/// Frame statistics published once per second by the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameStats {
    /// Frames drawn since the previous publish.
    pub fps: u32,
    /// Number of animated scene objects.
    pub object_count: usize,
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FPS: {}  Objects: {}", self.fps, self.object_count)
    }
}
