//! Stroke data
//!
//! A stroke is a finite chain of pressure-weighted points in a layer's
//! local coordinates; one point draws a filled disk, more points draw
//! round-capped segments between consecutive pairs.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::color::Color;
use crate::painter::{CompositeOp, Painter};
use crate::surface::Surface;

/// Stroke application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushMode {
    /// Paint with the stroke color (source-over)
    #[default]
    Brush,
    /// Remove pixels (destination-out)
    Eraser,
}

/// A single point in a stroke, in layer-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    /// Local X
    pub x: f32,
    /// Local Y
    pub y: f32,
    /// Normalized pressure (0.0 - 1.0)
    pub pressure: f32,
}

impl StrokePoint {
    /// Create a new stroke point, clamping pressure
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure: pressure.clamp(0.0, 1.0),
        }
    }
}

/// A complete stroke: points plus the brush parameters it was inked with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeData {
    /// Recorded points, in application order
    pub points: SmallVec<[StrokePoint; 16]>,
    /// Stroke color
    pub color: Color,
    /// Brush size in layer pixels at pressure 1
    pub size: f32,
    /// Brush or eraser
    pub mode: BrushMode,
}

impl StrokeData {
    /// Create an empty stroke with the given brush parameters
    pub fn new(color: Color, size: f32, mode: BrushMode) -> Self {
        Self {
            points: SmallVec::new(),
            color,
            size,
            mode,
        }
    }

    /// Append a point
    pub fn push(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    /// Number of recorded points
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Check if no points are recorded
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The largest brush radius reached along the stroke
    pub fn max_radius(&self) -> f32 {
        self.points
            .iter()
            .map(|p| self.size * p.pressure / 2.0)
            .fold(0.0f32, f32::max)
    }

    /// Total polyline length
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| {
                let dx = w[1].x - w[0].x;
                let dy = w[1].y - w[0].y;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// Replay the whole stroke onto a raster.
    ///
    /// One point draws a filled disk; two or more draw round-capped
    /// segments between consecutive pairs. This is the exact code path
    /// live drawing uses segment by segment, so a redo reproduces the
    /// live pixels bit for bit.
    pub fn replay(&self, target: &mut Surface) {
        match self.points.len() {
            0 => {}
            1 => {
                let p = self.points[0];
                draw_dot(target, p, self.color, self.size, self.mode);
            }
            _ => {
                for w in self.points.windows(2) {
                    draw_segment(target, w[0], w[1], self.color, self.size, self.mode);
                }
            }
        }
    }

    /// Inked bounding box `(min_x, min_y, max_x, max_y)`: the point
    /// bounds grown by the maximum brush radius
    pub fn inked_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        if self.points.is_empty() {
            return None;
        }

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let radius = self.max_radius();
        Some((min_x - radius, min_y - radius, max_x + radius, max_y + radius))
    }
}

fn stroke_style(color: Color, mode: BrushMode) -> (Color, CompositeOp) {
    match mode {
        BrushMode::Brush => (color, CompositeOp::SourceOver),
        // The eraser only consumes alpha; opaque black keeps the math exact
        BrushMode::Eraser => (Color::BLACK, CompositeOp::DestinationOut),
    }
}

/// Draw one round-capped segment of a stroke onto a raster.
///
/// The segment width follows the destination point's pressure.
pub(crate) fn draw_segment(
    target: &mut Surface,
    from: StrokePoint,
    to: StrokePoint,
    color: Color,
    size: f32,
    mode: BrushMode,
) {
    let (style, op) = stroke_style(color, mode);
    let width = (size * to.pressure).max(0.001) as f64;
    let mut painter = Painter::new(target);
    painter.set_composite(op);
    painter.stroke_segment(
        DVec2::new(from.x as f64, from.y as f64),
        DVec2::new(to.x as f64, to.y as f64),
        width,
        style,
    );
}

/// Draw the single-point dot of a stroke onto a raster
pub(crate) fn draw_dot(target: &mut Surface, point: StrokePoint, color: Color, size: f32, mode: BrushMode) {
    let (style, op) = stroke_style(color, mode);
    let radius = (size * point.pressure / 2.0).max(0.0005) as f64;
    let mut painter = Painter::new(target);
    painter.set_composite(op);
    painter.fill_disk(DVec2::new(point.x as f64, point.y as f64), radius, style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_clamped() {
        let p = StrokePoint::new(0.0, 0.0, 3.0);
        assert_eq!(p.pressure, 1.0);
    }

    #[test]
    fn test_inked_bounds() {
        let mut stroke = StrokeData::new(Color::BLACK, 10.0, BrushMode::Brush);
        stroke.push(StrokePoint::new(10.0, 20.0, 1.0));
        stroke.push(StrokePoint::new(50.0, 80.0, 0.5));

        let (min_x, min_y, max_x, max_y) = stroke.inked_bounds().unwrap();
        assert_eq!(min_x, 5.0);
        assert_eq!(min_y, 15.0);
        assert_eq!(max_x, 55.0);
        assert_eq!(max_y, 85.0);
    }

    #[test]
    fn test_length() {
        let mut stroke = StrokeData::new(Color::BLACK, 1.0, BrushMode::Brush);
        stroke.push(StrokePoint::new(0.0, 0.0, 1.0));
        stroke.push(StrokePoint::new(3.0, 4.0, 1.0));
        assert!((stroke.length() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_bounds() {
        let stroke = StrokeData::new(Color::BLACK, 1.0, BrushMode::Eraser);
        assert!(stroke.inked_bounds().is_none());
    }
}
