//! Contact side resolution for axis-aligned rectangles
//!
//! The hard part of the lander physics: given a collider overlapping a target,
//! decide which face(s) of the target were struck so the coordinator can push
//! the collider back out along the right axis.

use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Which faces of the target the collider struck.
///
/// `left` means the collider came in from the left, i.e. it hit the target's
/// left face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Sides {
    pub const NONE: Sides = Sides {
        left: false,
        right: false,
        top: false,
        bottom: false,
    };

    #[inline]
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    #[inline]
    pub fn vertical(&self) -> bool {
        self.top || self.bottom
    }

    /// True if both a horizontal and a vertical face were struck
    #[inline]
    pub fn hit_hv(&self) -> bool {
        self.horizontal() && self.vertical()
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.horizontal() || self.vertical()
    }
}

/// Determine the struck faces of `target` (assumes the rects overlap).
///
/// The comparisons are inclusive on the crossed edge. With strict comparisons
/// a collider at least as large as the target along one axis would only ever
/// report the perpendicular faces.
///
/// A collider that spans the target along an axis crosses both opposing
/// edges; only the shallower penetration is kept so the result never reports
/// left and right (or top and bottom) together.
pub fn resolve_sides(collider: &Rect, target: &Rect) -> Sides {
    let (a_left, a_right) = (collider.x, collider.right());
    let (a_top, a_bottom) = (collider.y, collider.bottom());
    let (b_left, b_right) = (target.x, target.right());
    let (b_top, b_bottom) = (target.y, target.bottom());

    let mut sides = Sides {
        left: a_right >= b_left && a_left < b_left,
        right: a_left <= b_right && a_right > b_right,
        top: a_bottom >= b_top && a_top < b_top,
        bottom: a_top <= b_bottom && a_bottom > b_bottom,
    };

    if sides.left && sides.right {
        let from_left = a_right - b_left;
        let from_right = b_right - a_left;
        if from_right < from_left {
            sides.left = false;
        } else {
            sides.right = false;
        }
    }
    if sides.top && sides.bottom {
        let from_top = a_bottom - b_top;
        let from_bottom = b_bottom - a_top;
        if from_bottom < from_top {
            sides.top = false;
        } else {
            sides.bottom = false;
        }
    }

    sides
}

/// Keep only the dominant axis when a corner was clipped.
///
/// A wide, shallow intersection is a vertical contact (keep top/bottom); a
/// tall, narrow one is horizontal (keep left/right). Square intersections
/// resolve horizontally.
pub fn resolve_hv(sides: &mut Sides, intersection: &Rect) {
    if sides.hit_hv() {
        if intersection.w > intersection.h {
            sides.left = false;
            sides.right = false;
        } else {
            sides.top = false;
            sides.bottom = false;
        }
    }
}

/// Check for a hit and optionally classify the struck faces.
///
/// Returns `(false, Sides::NONE)` when the rects do not overlap. When
/// `with_sides` is false the sides are left empty; the axis tie-break runs
/// only when `with_hv` is also set.
pub fn check_hit(collider: &Rect, target: &Rect, with_sides: bool, with_hv: bool) -> (bool, Sides) {
    if !collider.overlaps(target) {
        return (false, Sides::NONE);
    }
    if !with_sides {
        return (true, Sides::NONE);
    }
    let mut sides = resolve_sides(collider, target);
    if with_hv {
        resolve_hv(&mut sides, &collider.intersection(target));
    }
    (true, sides)
}
