//! Axis-aligned integer rectangles
//!
//! Edges are treated as closed intervals `[x, x + w]`, so two rectangles that
//! share an edge overlap. With integer-stepped motion this reports contact one
//! tick before a body sinks into another.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Move the rect without resizing it
    #[inline]
    pub fn set_xy(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// True unless one rect lies strictly beyond an edge of the other
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x > other.right()
            || self.right() < other.x
            || self.y > other.bottom()
            || self.bottom() < other.y)
    }

    /// Overlapping region of two rects.
    ///
    /// Only meaningful for overlapping rects; otherwise the result has a
    /// negative width or height.
    pub fn intersection(&self, other: &Rect) -> Rect {
        debug_assert!(
            self.overlaps(other),
            "intersection of disjoint rects {self:?} and {other:?}"
        );
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }
}
