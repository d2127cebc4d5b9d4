//! Axis-aligned box geometry
//!
//! Every entity in the runner is a rectangle anchored at its bottom-left
//! corner, with `+y` pointing up.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Bottom-left corner
    pub min: Vec2,
    /// Width and height (non-negative)
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width.max(0.0), height.max(0.0)),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap test; boxes that only share an edge do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.bottom() < other.top()
            && other.bottom() < self.top()
    }

    /// Overlapping region, if any
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        if !self.intersects(other) {
            return None;
        }
        let min = self.min.max(other.min);
        let max = self.max().min(other.max());
        Some(Aabb {
            min,
            size: max - min,
        })
    }

    /// Grow by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec2::splat(margin),
            size: self.size + Vec2::splat(margin * 2.0),
        }
    }

    /// Grow vertically by `amount` above and below (oscillation envelope)
    pub fn swept_vertically(&self, amount: f32) -> Aabb {
        let amount = amount.abs();
        Aabb {
            min: Vec2::new(self.min.x, self.min.y - amount),
            size: Vec2::new(self.size.x, self.size.y + amount * 2.0),
        }
    }
}
