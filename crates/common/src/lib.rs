//! Shared types for the orbitscene workspace.
//!
//! Everything here is plain data: no rendering, no scheduling.

mod settings;
mod stats;
mod types;

pub use settings::{ControlSettings, SCALE_MAX, SCALE_STEP, SettingsError};
pub use stats::FrameStats;
pub use types::{Rgb, SurfaceSize, Transform};
