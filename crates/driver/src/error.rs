use orbitscene_common::SurfaceSize;

/// Errors from mounting a render loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("output container has no area ({width}x{height})")]
    EmptyContainer { width: u32, height: u32 },
}

impl MountError {
    pub(crate) fn empty(size: SurfaceSize) -> Self {
        Self::EmptyContainer {
            width: size.width,
            height: size.height,
        }
    }
}

/// A bobbing mode name that is neither `oscillate` nor `drift`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bobbing mode {0:?} (expected \"oscillate\" or \"drift\")")]
pub struct UnknownBobbingMode(pub String);
