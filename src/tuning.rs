//! Data-driven physics constants
//!
//! Levels may override any subset of these in their `tuning` block; missing
//! fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::consts::DEG_TO_RAD;
use crate::sim::Rect;

/// Hit footprint of a rotating body in its upright orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Footprint {
    pub const fn new(offset_x: i32, offset_y: i32, width: i32, height: i32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// Morph the upright footprint toward its sideways counterpart.
    ///
    /// `sin²(r)` weights the sideways shape and `cos²(r)` the upright one, so
    /// the axis-aligned box tracks the ship as it rotates. Returns the hit
    /// offset and a rect sized accordingly (position left at the origin).
    pub fn morph(&self, rotation: f64) -> (i32, i32, Rect) {
        let sideways = rotation.sin().powi(2);
        let upright = rotation.cos().powi(2);
        let diff = (self.width - self.height) / 2;

        let w = (self.height as f64 * sideways + self.width as f64 * upright) as i32;
        let h = (self.width as f64 * sideways + self.height as f64 * upright) as i32;
        let shift = (diff as f64 * sideways) as i32;

        (
            self.offset_x + shift,
            self.offset_y - shift,
            Rect::new(0, 0, w, h),
        )
    }
}

/// Player ship handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Forward thrust per tick
    pub thrust: f64,
    /// Retro and strafe thrust per tick
    pub retro: f64,
    /// Rotation speed in degrees per tick
    pub rotation_speed_deg: f64,
    /// Mass multiplier applied to friction and gravity
    pub weight: f64,
    /// Horizontal velocity multiplier while grounded
    pub grounded_damping: f64,
    /// Rate at which a grounded ship rights itself
    pub upright_ease: f64,
    /// Angle (radians) within which the ship snaps upright
    pub upright_epsilon: f64,
    /// Gravity divisor for the nose-up restoring torque
    pub nose_up_divisor: f64,
    /// Gravity divisor for the nose-down restoring torque
    pub nose_down_divisor: f64,
    pub footprint: Footprint,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            thrust: 0.06,
            retro: 0.03,
            rotation_speed_deg: 1.2,
            weight: 1.0,
            grounded_damping: 0.96,
            upright_ease: 0.1,
            upright_epsilon: 0.01,
            nose_up_divisor: 4.0,
            nose_down_divisor: 6.0,
            footprint: Footprint::new(8, 8, 30, 48),
        }
    }
}

impl PlayerTuning {
    /// Rotation speed in radians per tick
    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed_deg * DEG_TO_RAD
    }
}

/// Scripted collision test body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterTuning {
    pub speed: f64,
    pub damping: f64,
    pub rotation_speed_deg: f64,
    pub footprint: Footprint,
}

impl Default for TesterTuning {
    fn default() -> Self {
        Self {
            speed: 0.8,
            damping: 0.9,
            rotation_speed_deg: 1.6,
            footprint: Footprint::new(4, 4, 24, 56),
        }
    }
}

impl TesterTuning {
    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed_deg * DEG_TO_RAD
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub tester: TesterTuning,
}
