//! Axis-aligned boxes and image extents in floating-point pixel space.

use serde::{Deserialize, Serialize};

/// Width and height of a source image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageExtent {
    pub width: u32,
    pub height: u32,
}

impl ImageExtent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned bounding box given by its corners.
///
/// Detections arrive with `x1 < x2` and `y1 < y2`; degenerate boxes are
/// tolerated and simply have zero area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a box from its center point and size, the format hosted
    /// inference services report.
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self {
            x1: cx - half_w,
            y1: cy - half_h,
            x2: cx + half_w,
            y2: cy + half_h,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Plain `(x2 - x1) * (y2 - y1)`; coordinates are continuous, so there is
    /// no inclusive-pixel `+1`.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// `true` when the box covers no area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn intersection_area(&self, other: &Self) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Intersection over union; 0 whenever the union has no area.
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection = self.intersection_area(other);
        if intersection <= 0.0 {
            return 0.0;
        }
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    /// Grow the box by `padding` pixels on all four sides.
    pub fn expand(&self, padding: f32) -> Self {
        Self {
            x1: self.x1 - padding,
            y1: self.y1 - padding,
            x2: self.x2 + padding,
            y2: self.y2 + padding,
        }
    }

    /// Clip every coordinate into `[0, width] x [0, height]`.
    ///
    /// A box lying entirely outside the image collapses onto the nearest edge
    /// and becomes empty rather than wrapping or inverting.
    pub fn clamp_to(&self, extent: ImageExtent) -> Self {
        let w = extent.width as f32;
        let h = extent.height as f32;
        let x1 = self.x1.clamp(0.0, w);
        let y1 = self.y1.clamp(0.0, h);
        Self {
            x1,
            y1,
            x2: self.x2.clamp(0.0, w).max(x1),
            y2: self.y2.clamp(0.0, h).max(y1),
        }
    }
}
