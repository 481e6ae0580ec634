//! Object animation model and orbit camera path.
//!
//! All motion is a function of the frame count and the wall clock, never of
//! per-object configuration.

use glam::Vec3;
use orbitscene_common::ControlSettings;
use orbitscene_render::PerspectiveCamera;
use orbitscene_scene::{Scene, SceneObject};
use std::f32::consts::TAU;
use std::str::FromStr;

use crate::error::UnknownBobbingMode;

/// Angular velocity shared by every object, radians per frame.
pub const SPIN_BASE: f32 = 0.01;
/// Extra X spin per object index.
pub const SPIN_STEP_X: f32 = 0.002;
/// Extra Y spin per object index.
pub const SPIN_STEP_Y: f32 = 0.003;

/// Bobbing phase rate, radians per wall-clock millisecond.
pub const BOB_RATE: f64 = 0.001;
/// Per-frame increment scale in [`BobbingMode::Drift`].
pub const DRIFT_STEP: f64 = 0.001;
/// Offset amplitude in [`BobbingMode::Oscillate`].
pub const OSCILLATE_AMPLITUDE: f64 = 0.06;

/// Camera orbit phase rate, radians per wall-clock millisecond.
pub const ORBIT_RATE: f64 = 0.0003;
pub const ORBIT_RADIUS: f32 = 15.0;
/// The orbit circle is centered on z = 10, not on the target.
pub const ORBIT_CENTER_Z: f32 = 10.0;

/// How the vertical bobbing is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BobbingMode {
    /// Absolute offset from the rest position: bounded and frame-rate
    /// independent.
    #[default]
    Oscillate,
    /// Adds a small sinusoidal delta each frame. Accumulates, and the
    /// resulting offset depends on frame rate and start time.
    Drift,
}

impl BobbingMode {
    pub fn name(self) -> &'static str {
        match self {
            BobbingMode::Oscillate => "oscillate",
            BobbingMode::Drift => "drift",
        }
    }
}

impl std::fmt::Display for BobbingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BobbingMode {
    type Err = UnknownBobbingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oscillate" => Ok(BobbingMode::Oscillate),
            "drift" => Ok(BobbingMode::Drift),
            _ => Err(UnknownBobbingMode(s.to_string())),
        }
    }
}

/// Per-frame (x, y) rotation increments for the object at `index`.
pub fn spin_rate(index: usize) -> (f32, f32) {
    let i = index as f32;
    (SPIN_BASE + i * SPIN_STEP_X, SPIN_BASE + i * SPIN_STEP_Y)
}

/// Advance an object's rotation by one frame, scaled by `speed`.
/// Angles stay in [0, 2PI).
pub fn advance_spin(obj: &mut SceneObject, speed: f32) {
    let (dx, dy) = spin_rate(obj.index());
    let r = &mut obj.transform.rotation;
    r.x = (r.x + dx * speed).rem_euclid(TAU);
    r.y = (r.y + dy * speed).rem_euclid(TAU);
}

fn bob_wave(index: usize, wall_ms: f64) -> f64 {
    (wall_ms * BOB_RATE + index as f64).sin()
}

pub fn apply_bobbing(obj: &mut SceneObject, wall_ms: f64, mode: BobbingMode) {
    let wave = bob_wave(obj.index(), wall_ms);
    match mode {
        BobbingMode::Drift => {
            obj.transform.position.y += (wave * DRIFT_STEP) as f32;
        }
        BobbingMode::Oscillate => {
            obj.transform.position.y = obj.rest_position().y + (wave * OSCILLATE_AMPLITUDE) as f32;
        }
    }
}

/// Spin and bob every object for one frame.
pub fn animate_objects(
    scene: &mut Scene,
    settings: &ControlSettings,
    mode: BobbingMode,
    wall_ms: f64,
) {
    for obj in scene.objects_mut().iter_mut() {
        if settings.auto_rotate {
            advance_spin(obj, settings.rotation_speed);
        }
        apply_bobbing(obj, wall_ms, mode);
    }
}

/// Camera position on the orbit at `wall_ms`, keeping the given height.
pub fn orbit_position(wall_ms: f64, y: f32) -> Vec3 {
    let t = wall_ms * ORBIT_RATE;
    Vec3::new(
        (t.sin() * ORBIT_RADIUS as f64) as f32,
        y,
        (t.cos() * ORBIT_RADIUS as f64) as f32 + ORBIT_CENTER_Z,
    )
}

/// Move the camera along the orbit and re-aim it at the origin.
pub fn orbit_camera(camera: &mut PerspectiveCamera, wall_ms: f64) {
    camera.position = orbit_position(wall_ms, camera.position.y);
    camera.look_at(Vec3::ZERO);
}
