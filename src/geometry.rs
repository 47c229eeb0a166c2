//! Geometry utilities module
//!
//! Rectangles and 2D affine transforms shared by the camera, the
//! compositor and layer poses. All viewport math is carried in `f64`
//! so screen/world round-trips stay exact well below a millipixel.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create from two corner points
    pub fn from_points(p1: DVec2, p2: DVec2) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        Self {
            x,
            y,
            width: (p1.x - p2.x).abs(),
            height: (p1.y - p2.y).abs(),
        }
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Get center point
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if point is inside rectangle
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Get intersection with another rectangle
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Get union with another rectangle
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Expand rectangle by amount on every side
    pub fn expand(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// 2D affine transformation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0  1  |
    pub matrix: [f64; 6],
}

impl Affine {
    /// Identity transform
    pub const IDENTITY: Affine = Affine {
        matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    /// Translation transform
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            matrix: [1.0, 0.0, 0.0, 1.0, tx, ty],
        }
    }

    /// Uniform or non-uniform scale transform
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            matrix: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    /// Rotation transform (angle in radians)
    pub fn rotation(angle: f64) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            matrix: [cos, sin, -sin, cos, 0.0, 0.0],
        }
    }

    /// Apply `local` in this transform's coordinate system.
    ///
    /// `t.concat(local)` maps a point `p` to `t(local(p))`, matching the
    /// translate/rotate/scale call chaining of a 2D drawing context.
    pub fn concat(&self, local: &Affine) -> Affine {
        let m = &self.matrix;
        let n = &local.matrix;
        Affine {
            matrix: [
                m[0] * n[0] + m[2] * n[1],
                m[1] * n[0] + m[3] * n[1],
                m[0] * n[2] + m[2] * n[3],
                m[1] * n[2] + m[3] * n[3],
                m[0] * n[4] + m[2] * n[5] + m[4],
                m[1] * n[4] + m[3] * n[5] + m[5],
            ],
        }
    }

    /// Transform a point
    pub fn transform_point(&self, point: DVec2) -> DVec2 {
        let m = &self.matrix;
        DVec2::new(
            m[0] * point.x + m[2] * point.y + m[4],
            m[1] * point.x + m[3] * point.y + m[5],
        )
    }

    /// Axis-aligned bounds of a transformed rectangle
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(DVec2::new(rect.x, rect.y)),
            self.transform_point(DVec2::new(rect.right(), rect.y)),
            self.transform_point(DVec2::new(rect.x, rect.bottom())),
            self.transform_point(DVec2::new(rect.right(), rect.bottom())),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Uniform scale factor of this transform (`sqrt(|det|)`)
    pub fn uniform_scale(&self) -> f64 {
        let m = &self.matrix;
        (m[0] * m[3] - m[1] * m[2]).abs().sqrt()
    }

    /// Get inverse transform
    pub fn inverse(&self) -> Option<Affine> {
        let m = &self.matrix;
        let det = m[0] * m[3] - m[1] * m[2];

        if det.abs() < f64::EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;

        Some(Affine {
            matrix: [
                m[3] * inv_det,
                -m[1] * inv_det,
                -m[2] * inv_det,
                m[0] * inv_det,
                (m[2] * m[5] - m[3] * m[4]) * inv_det,
                (m[1] * m[4] - m[0] * m[5]) * inv_det,
            ],
        })
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}
