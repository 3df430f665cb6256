//! Moonlander - a thrust-and-rotate lander racing game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, lap state)
//! - `level`: Level description loaded from JSON
//! - `tuning`: Data-driven physics constants

pub mod level;
pub mod sim;
pub mod tuning;

pub use level::{BodySpec, LevelConfig, LevelError};
pub use tuning::Tuning;

use std::f64::consts::TAU;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per frame)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

    /// Default level size when a level omits it
    pub const DEFAULT_LEVEL_WIDTH: i32 = 1150;
    pub const DEFAULT_LEVEL_HEIGHT: i32 = 864;
}

/// Normalize an angle to [0, 2π)
///
/// `rem_euclid` can round up to exactly TAU for tiny negative inputs, so that
/// case wraps to zero.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}
