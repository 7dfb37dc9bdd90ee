//! Axis-aligned bounding boxes
//!
//! Positions are the top-left corner, y grows downward. Grid variants use
//! unit cells, where overlap reduces to cell equality.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with non-negative extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    size: Vec2,
}

impl Rect {
    /// Negative extents are clamped to zero
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            size: size.max(Vec2::ZERO),
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Separating-axis test; touching edges do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && other.min.x < a_max.x && self.min.y < b_max.y && other.min.y < a_max.y
    }

    /// Whether `other` lies entirely inside this rectangle (edges included)
    pub fn contains(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && b_max.x <= a_max.x
            && b_max.y <= a_max.y
    }
}
