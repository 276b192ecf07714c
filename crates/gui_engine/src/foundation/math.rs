//! Math utilities and types
//!
//! Provides the 2D pixel-space math used by hit-testing and batching, layered
//! on top of nalgebra's generic vector and matrix types.

pub use nalgebra::{Matrix4, Vector2, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 2D integer vector for pixel coordinates
pub type Vec2I = Vector2<i32>;

/// Manhattan distance between two pixel positions
pub fn manhattan_dist(a: Vec2I, b: Vec2I) -> u32 {
    (a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()
}

/// Transform a pixel position by an affine world matrix, rounding back to pixels
pub fn transform_point(matrix: &Mat4, point: Vec2I) -> Vec2I {
    let v = matrix * Vec4::new(point.x as f32, point.y as f32, 0.0, 1.0);
    Vec2I::new(v.x.round() as i32, v.y.round() as i32)
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectI {
    /// Left edge in pixels
    pub x: i32,
    /// Top edge in pixels
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl RectI {
    /// Create a new rectangle
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether a point falls inside the rectangle
    ///
    /// The left/top edges are inclusive, the right/bottom edges exclusive.
    pub fn contains(&self, point: Vec2I) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Check whether two rectangles share any area
    pub fn overlaps(&self, other: &RectI) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Grow this rectangle so that it fully contains another
    pub fn encapsulate(&mut self, other: &RectI) {
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);

        self.x = self.x.min(other.x);
        self.y = self.y.min(other.y);
        self.width = right - self.x;
        self.height = bottom - self.y;
    }

    /// Transform the rectangle by an affine matrix and return the bounding
    /// rectangle of the transformed corners
    pub fn transform(&self, matrix: &Mat4) -> RectI {
        let corners = [
            Vec2I::new(self.x, self.y),
            Vec2I::new(self.x + self.width, self.y),
            Vec2I::new(self.x, self.y + self.height),
            Vec2I::new(self.x + self.width, self.y + self.height),
        ];

        let mut min = Vec2I::new(i32::MAX, i32::MAX);
        let mut max = Vec2I::new(i32::MIN, i32::MIN);

        for corner in corners {
            let p = transform_point(matrix, corner);
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        RectI::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}
