//! Settings panel.
//!
//! # Invariants
//! - Every effective change produces exactly one full snapshot for the
//!   listener; no-op edits produce none.
//! - Scalar settings stay inside the slider range.

mod panel;

pub use panel::{SettingsChange, SettingsPanel};
