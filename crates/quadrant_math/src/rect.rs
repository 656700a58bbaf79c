//! Axis-aligned rectangle

use serde::{Serialize, Deserialize};
use crate::Vec2;

/// An axis-aligned rectangle defined by its minimum and maximum corners
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum corner (smallest x and y)
    pub min: Vec2,
    /// Maximum corner (largest x and y)
    pub max: Vec2,
}

impl Rect {
    /// Create a rectangle from two corners in any order
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min_components(b),
            max: a.max_components(b),
        }
    }

    /// Create a rectangle centered at `center` with the given full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Smallest rectangle containing a circle
    pub fn from_circle(center: Vec2, radius: f32) -> Self {
        Self::from_center_size(center, Vec2::splat(radius * 2.0))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Check whether a point lies inside or on the edge
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Move the rectangle by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Self {
        Self {
            min: self.min.min_components(other.min),
            max: self.max.max_components(other.max),
        }
    }

    /// The four corners, counter-clockwise from `min`
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}
