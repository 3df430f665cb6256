//! Physical bodies
//!
//! Every body shares one `Body` struct (position, velocity, hit shape) and
//! carries a `BodyKind` tag holding kind-specific state. Behavior dispatches by
//! matching on the tag.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::normalize_angle;
use crate::tuning::Footprint;

/// Player-only state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Standing on a wall; rederived by every collision pass
    pub grounded: bool,
    /// Upright hit footprint the rotating hit rect is morphed from
    pub footprint: Footprint,
}

/// Scripted collision test body state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesterState {
    pub footprint: Footprint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointState {
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishState {
    /// Roster indices of the checkpoints that gate a lap
    pub checkpoints: Vec<usize>,
    pub finished: bool,
}

/// Body kind tag plus kind-specific state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BodyKind {
    Player(PlayerState),
    Square,
    Wall,
    Checkpoint(CheckpointState),
    Finish(FinishState),
    Tester(TesterState),
    Background,
}

impl BodyKind {
    /// Stable numeric tag, also used in debug output
    pub fn id(&self) -> u8 {
        match self {
            BodyKind::Player(_) => 1,
            BodyKind::Square => 2,
            BodyKind::Wall => 3,
            BodyKind::Tester(_) => 4,
            BodyKind::Finish(_) => 5,
            BodyKind::Checkpoint(_) => 6,
            BodyKind::Background => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BodyKind::Player(_) => "player",
            BodyKind::Square => "square",
            BodyKind::Wall => "wall",
            BodyKind::Tester(_) => "tester",
            BodyKind::Finish(_) => "finish",
            BodyKind::Checkpoint(_) => "checkpoint",
            BodyKind::Background => "background",
        }
    }

    /// Moved by the integrator every tick
    pub fn integrates(&self) -> bool {
        matches!(
            self,
            BodyKind::Player(_) | BodyKind::Square | BodyKind::Tester(_)
        )
    }

    /// Sweeps the roster for contacts every tick
    pub fn collides(&self) -> bool {
        self.integrates()
    }

    /// Can be struck by a collider
    pub fn hittable(&self) -> bool {
        !matches!(self, BodyKind::Background)
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, BodyKind::Wall)
    }

    pub fn is_player(&self) -> bool {
        matches!(self, BodyKind::Player(_))
    }
}

/// Custom hit area, offset from the body's position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitShape {
    pub offset: IVec2,
    pub rect: Rect,
}

/// A physical body in the level roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    /// World position of the visual's top-left corner
    pub pos: DVec2,
    /// Orientation in radians, [0, 2π)
    pub rotation: f64,
    /// Velocity in units per tick
    pub vel: DVec2,
    /// Visual footprint, independent from the hit rect
    pub size: IVec2,
    pub shape: HitShape,
    /// Solid bodies block; non-solid ones only trigger
    pub solid: bool,
    /// Currently touched by a collider (debug highlight)
    #[serde(skip)]
    pub hit: bool,
    /// Roster index of the body this collider last flagged as hit
    #[serde(skip)]
    pub last_hit: Option<usize>,
    /// Debug/render color, RGBA
    pub color: [u8; 4],
}

impl Body {
    /// Create a body whose hit rect is `hit_w x hit_h` at `(x + rx, y + ry)`.
    ///
    /// The visual footprint covers the hit rect plus its offset on both sides.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        kind: BodyKind,
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        hit_w: i32,
        hit_h: i32,
        solid: bool,
    ) -> Self {
        Self {
            id,
            kind,
            pos: DVec2::new(x as f64, y as f64),
            rotation: 0.0,
            vel: DVec2::ZERO,
            size: IVec2::new(hit_w + rx * 2, hit_h + ry * 2),
            shape: HitShape {
                offset: IVec2::new(rx, ry),
                rect: Rect::new(x + rx, y + ry, hit_w, hit_h),
            },
            solid,
            hit: false,
            last_hit: None,
            color: [255, 255, 255, 255],
        }
    }

    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.shape.rect
    }

    /// Snap the hit rect to `floor(pos) + offset`
    pub fn sync_rect(&mut self) {
        let x = self.pos.x.floor() as i32 + self.shape.offset.x;
        let y = self.pos.y.floor() as i32 + self.shape.offset.y;
        self.shape.rect.set_xy(x, y);
    }

    /// Recompute the hit rect's size and offset from an upright footprint for
    /// the current rotation
    pub fn morph_shape(&mut self, footprint: &Footprint) {
        let (rx, ry, rect) = footprint.morph(self.rotation);
        self.shape.offset = IVec2::new(rx, ry);
        self.shape.rect.w = rect.w;
        self.shape.rect.h = rect.h;
    }

    /// Rotate by `delta` radians, wrapping into [0, 2π)
    pub fn rotate(&mut self, delta: f64) {
        self.rotation = normalize_angle(self.rotation + delta);
    }

    /// Move to `(x, y)`, clear rotation and velocity
    pub fn reset_to(&mut self, x: i32, y: i32) {
        self.pos = DVec2::new(x as f64, y as f64);
        self.rotation = 0.0;
        self.vel = DVec2::ZERO;
        self.sync_rect();
    }

    pub fn grounded(&self) -> bool {
        match &self.kind {
            BodyKind::Player(p) => p.grounded,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_places_hit_rect_at_offset() {
        let body = Body::new(1, BodyKind::Wall, 100, 50, 4, 6, 20, 10, true);
        assert_eq!(*body.rect(), Rect::new(104, 56, 20, 10));
        assert_eq!(body.size, IVec2::new(28, 22));
    }

    #[test]
    fn test_sync_rect_floors_position() {
        let mut body = Body::new(1, BodyKind::Square, 0, 0, 2, 2, 10, 10, true);
        body.pos = DVec2::new(3.9, -0.5);
        body.sync_rect();
        assert_eq!(body.rect().x, 5);
        assert_eq!(body.rect().y, 1);
    }

    #[test]
    fn test_rotate_wraps() {
        let mut body = Body::new(1, BodyKind::Square, 0, 0, 0, 0, 1, 1, true);
        body.rotate(-0.1);
        assert!(body.rotation > 6.0 && body.rotation < std::f64::consts::TAU);
        body.rotate(0.2);
        assert!((body.rotation - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_kind_roles() {
        assert!(BodyKind::Square.collides());
        assert!(!BodyKind::Wall.integrates());
        assert!(BodyKind::Wall.hittable());
        assert!(!BodyKind::Background.hittable());
        assert_eq!(BodyKind::Checkpoint(CheckpointState::default()).id(), 6);
    }
}
