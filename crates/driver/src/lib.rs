//! Render Loop Driver: lifecycle, per-frame animation and viewport handling.
//!
//! # Invariants
//! - At most one frame callback is pending at any time.
//! - After teardown no tick mutates the scene or reaches the renderer.
//! - The object count never changes while the loop runs.
//!
//! Scheduling is explicit: the host delivers [`FrameTick`]s for handles the
//! driver requested through its [`FrameScheduler`]. Everything runs on one
//! thread; the settings and stats channels only carry whole snapshots.

pub mod animation;
mod driver;
mod error;
pub mod schedule;
mod stats;
mod viewport;

pub use animation::BobbingMode;
pub use driver::{DriverConfig, FrameReport, LoopState, RenderLoop};
pub use error::{MountError, UnknownBobbingMode};
pub use schedule::{FrameHandle, FrameScheduler, FrameTick, ManualScheduler};
pub use stats::{FrameCounter, STATS_INTERVAL_MS};
pub use viewport::Viewport;
