//! Software 2D drawing context
//!
//! [`Painter`] wraps a mutable [`Surface`] with the drawing-context
//! state the compositor and layers rely on: an affine transform stack,
//! a device-space clip rectangle, global alpha, a composite operation
//! and a blend mode. Primitives are rendered with analytic coverage
//! (one-pixel antialiasing ramp) and Porter-Duff compositing.
//!
//! Rect fills assume axis-aligned user rectangles under scale/translate
//! transforms; posed (possibly rotated) layer rasters go through
//! [`Painter::draw_surface`], which inverse-maps with bilinear
//! filtering.

use glam::DVec2;

use crate::color::Color;
use crate::geometry::{Affine, Rect};
use crate::layer::BlendMode;
use crate::surface::Surface;

/// Porter-Duff composite operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOp {
    /// Source over destination (painting)
    #[default]
    SourceOver,
    /// Destination kept where source is absent (erasing)
    DestinationOut,
}

#[derive(Debug, Clone, Copy)]
struct PainterState {
    transform: Affine,
    clip: Option<Rect>,
    alpha: f32,
    composite: CompositeOp,
    blend: BlendMode,
}

impl Default for PainterState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip: None,
            alpha: 1.0,
            composite: CompositeOp::SourceOver,
            blend: BlendMode::Normal,
        }
    }
}

/// Stateful drawing context over a surface
pub struct Painter<'a> {
    surface: &'a mut Surface,
    state: PainterState,
    stack: Vec<PainterState>,
}

impl<'a> Painter<'a> {
    /// Create a painter over a surface with identity state
    pub fn new(surface: &'a mut Surface) -> Self {
        Self {
            surface,
            state: PainterState::default(),
            stack: Vec::new(),
        }
    }

    /// Push the current state
    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pop the most recently saved state. No-op on an empty stack.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    /// Replace the current transform
    pub fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    /// Current transform
    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    /// Append a translation in the current coordinate system
    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.state.transform = self.state.transform.concat(&Affine::translation(tx, ty));
    }

    /// Append a rotation (radians) in the current coordinate system
    pub fn rotate(&mut self, angle: f64) {
        self.state.transform = self.state.transform.concat(&Affine::rotation(angle));
    }

    /// Append a uniform scale in the current coordinate system
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform.concat(&Affine::scale(sx, sy));
    }

    /// Intersect the clip with a rectangle given in the current
    /// coordinate system (its device-space AABB is used)
    pub fn clip_rect(&mut self, rect: Rect) {
        let device = self.state.transform.transform_rect(&rect);
        self.state.clip = Some(match self.state.clip {
            Some(existing) => existing
                .intersection(&device)
                .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0)),
            None => device,
        });
    }

    /// Set global alpha
    pub fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Set the composite operation
    pub fn set_composite(&mut self, op: CompositeOp) {
        self.state.composite = op;
    }

    /// Set the blend mode
    pub fn set_blend(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    /// Surface width in pixels
    pub fn surface_width(&self) -> u32 {
        self.surface.width()
    }

    /// Surface height in pixels
    pub fn surface_height(&self) -> u32 {
        self.surface.height()
    }

    /// Clear the whole surface to transparent (ignores state)
    pub fn clear(&mut self) {
        self.surface.clear();
    }

    /// Fill the whole surface with a color (ignores state)
    pub fn fill_all(&mut self, color: Color) {
        self.surface.fill(color);
    }

    /// Fill an axis-aligned rectangle
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let device = self.state.transform.transform_rect(&rect);
        let Some((x0, y0, x1, y1)) = self.device_span(&device) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let cov_x = ((device.right()).min(x as f64 + 1.0) - device.x.max(x as f64)).clamp(0.0, 1.0);
                let cov_y = ((device.bottom()).min(y as f64 + 1.0) - device.y.max(y as f64)).clamp(0.0, 1.0);
                let cov = (cov_x * cov_y) as f32;
                if cov > 0.0 {
                    self.composite_at(x, y, color, cov);
                }
            }
        }
    }

    /// Outline an axis-aligned rectangle with a given line width,
    /// centered on the edges
    pub fn stroke_rect(&mut self, rect: Rect, line_width: f64, color: Color) {
        let h = line_width / 2.0;
        // top, bottom, left, right bands
        self.fill_rect(Rect::new(rect.x - h, rect.y - h, rect.width + line_width, line_width), color);
        self.fill_rect(Rect::new(rect.x - h, rect.bottom() - h, rect.width + line_width, line_width), color);
        self.fill_rect(Rect::new(rect.x - h, rect.y + h, line_width, rect.height - line_width), color);
        self.fill_rect(Rect::new(rect.right() - h, rect.y + h, line_width, rect.height - line_width), color);
    }

    /// Fill a disk centered at `center` with the given radius
    pub fn fill_disk(&mut self, center: DVec2, radius: f64, color: Color) {
        let scale = self.state.transform.uniform_scale();
        let c = self.state.transform.transform_point(center);
        let r = radius * scale;
        let bounds = Rect::new(c.x - r - 1.0, c.y - r - 1.0, (r + 1.0) * 2.0, (r + 1.0) * 2.0);
        let Some((x0, y0, x1, y1)) = self.device_span(&bounds) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - c.x;
                let dy = y as f64 + 0.5 - c.y;
                let dist = (dx * dx + dy * dy).sqrt();
                let cov = (r + 0.5 - dist).clamp(0.0, 1.0) as f32;
                if cov > 0.0 {
                    self.composite_at(x, y, color, cov);
                }
            }
        }
    }

    /// Stroke a line segment with round caps (a capsule).
    ///
    /// A zero-length segment degenerates to a filled disk, which is what
    /// gives single-point strokes their dot.
    pub fn stroke_segment(&mut self, p0: DVec2, p1: DVec2, width: f64, color: Color) {
        let scale = self.state.transform.uniform_scale();
        let a = self.state.transform.transform_point(p0);
        let b = self.state.transform.transform_point(p1);
        let r = (width.max(0.001) / 2.0) * scale;

        let min = a.min(b) - DVec2::splat(r + 1.0);
        let max = a.max(b) + DVec2::splat(r + 1.0);
        let bounds = Rect::new(min.x, min.y, max.x - min.x, max.y - min.y);
        let Some((x0, y0, x1, y1)) = self.device_span(&bounds) else {
            return;
        };

        let ab = b - a;
        let len_sq = ab.length_squared();

        for y in y0..y1 {
            for x in x0..x1 {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let dist = (p - (a + ab * t)).length();
                let cov = (r + 0.5 - dist).clamp(0.0, 1.0) as f32;
                if cov > 0.0 {
                    self.composite_at(x, y, color, cov);
                }
            }
        }
    }

    /// Stroke a circle outline
    pub fn stroke_circle(&mut self, center: DVec2, radius: f64, line_width: f64, color: Color) {
        let scale = self.state.transform.uniform_scale();
        let c = self.state.transform.transform_point(center);
        let r = radius * scale;
        let hw = (line_width.max(0.001) / 2.0) * scale;
        let reach = r + hw + 1.0;
        let bounds = Rect::new(c.x - reach, c.y - reach, reach * 2.0, reach * 2.0);
        let Some((x0, y0, x1, y1)) = self.device_span(&bounds) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - c.x;
                let dy = y as f64 + 0.5 - c.y;
                let dist = (dx * dx + dy * dy).sqrt();
                let cov = (hw + 0.5 - (dist - r).abs()).clamp(0.0, 1.0) as f32;
                if cov > 0.0 {
                    self.composite_at(x, y, color, cov);
                }
            }
        }
    }

    /// Draw a source surface under the current transform.
    ///
    /// The source's pixel grid spans `[0, w] x [0, h]` in user units.
    /// Destination pixels are inverse-mapped and sampled bilinearly, so
    /// integer-aligned unscaled draws stay exact.
    pub fn draw_surface(&mut self, src: &Surface, opacity: f32) {
        let Some(inverse) = self.state.transform.inverse() else {
            return;
        };
        let user_rect = Rect::new(0.0, 0.0, src.width() as f64, src.height() as f64);
        let device = self.state.transform.transform_rect(&user_rect);
        // One-pixel apron for antialiased edges
        let Some((x0, y0, x1, y1)) = self.device_span(&device.expand(1.0)) else {
            return;
        };

        let alpha = (opacity * self.state.alpha).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                let p = inverse.transform_point(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
                let sample = src.sample_bilinear(p.x as f32, p.y as f32);
                if sample[3] <= 0.0 {
                    continue;
                }
                let color = Color::from_rgba(sample[0], sample[1], sample[2], sample[3]);
                self.composite_raw(x, y, color, alpha);
            }
        }
    }

    /// Draw a source surface scaled into the user-space rectangle
    /// `(dx, dy, dw, dh)`
    pub fn draw_surface_rect(&mut self, src: &Surface, dx: f64, dy: f64, dw: f64, dh: f64) {
        if dw <= 0.0 || dh <= 0.0 || src.width() == 0 || src.height() == 0 {
            return;
        }
        self.save();
        self.translate(dx, dy);
        self.scale(dw / src.width() as f64, dh / src.height() as f64);
        self.draw_surface(src, 1.0);
        self.restore();
    }

    /// Integer device span of a device-space AABB after clip and surface
    /// bounds, or `None` when nothing is visible
    fn device_span(&self, device: &Rect) -> Option<(u32, u32, u32, u32)> {
        let mut rect = *device;
        if let Some(clip) = self.state.clip {
            rect = rect.intersection(&clip)?;
        }
        let x0 = rect.x.floor().max(0.0) as i64;
        let y0 = rect.y.floor().max(0.0) as i64;
        let x1 = (rect.right().ceil() as i64).min(self.surface.width() as i64);
        let y1 = (rect.bottom().ceil() as i64).min(self.surface.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Composite a color with coverage, applying global alpha
    fn composite_at(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        self.composite_raw(x, y, color, coverage * self.state.alpha);
    }

    fn composite_raw(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let src_a = color.a * coverage;
        if src_a <= 0.0 {
            return;
        }

        let idx = ((y * self.surface.width() + x) * 4) as usize;
        let pixels = self.surface.pixels_mut();
        let dst_r = pixels[idx] as f32 / 255.0;
        let dst_g = pixels[idx + 1] as f32 / 255.0;
        let dst_b = pixels[idx + 2] as f32 / 255.0;
        let dst_a = pixels[idx + 3] as f32 / 255.0;

        match self.state.composite {
            CompositeOp::SourceOver => {
                // Weight the blended color by backdrop alpha so blend
                // modes fade out over transparency
                let mixed = self.state.blend.mix_rgb([dst_r, dst_g, dst_b], [color.r, color.g, color.b]);
                let src_r = color.r * (1.0 - dst_a) + mixed[0] * dst_a;
                let src_g = color.g * (1.0 - dst_a) + mixed[1] * dst_a;
                let src_b = color.b * (1.0 - dst_a) + mixed[2] * dst_a;

                let out_a = src_a + dst_a * (1.0 - src_a);
                if out_a <= 0.0 {
                    pixels[idx..idx + 4].fill(0);
                    return;
                }
                let out_r = (src_r * src_a + dst_r * dst_a * (1.0 - src_a)) / out_a;
                let out_g = (src_g * src_a + dst_g * dst_a * (1.0 - src_a)) / out_a;
                let out_b = (src_b * src_a + dst_b * dst_a * (1.0 - src_a)) / out_a;

                pixels[idx] = (out_r * 255.0).round().clamp(0.0, 255.0) as u8;
                pixels[idx + 1] = (out_g * 255.0).round().clamp(0.0, 255.0) as u8;
                pixels[idx + 2] = (out_b * 255.0).round().clamp(0.0, 255.0) as u8;
                pixels[idx + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
            CompositeOp::DestinationOut => {
                let out_a = dst_a * (1.0 - src_a);
                if out_a < 0.004 {
                    pixels[idx..idx + 4].fill(0);
                } else {
                    pixels[idx + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_opaque_center() {
        let mut surface = Surface::new(20, 20).unwrap();
        let mut p = Painter::new(&mut surface);
        p.fill_rect(Rect::new(5.0, 5.0, 10.0, 10.0), Color::from_rgb(1.0, 0.0, 0.0));
        drop(p);

        let c = surface.get_rgba8(10, 10).unwrap();
        assert_eq!(c, [255, 0, 0, 255]);
        let outside = surface.get_rgba8(2, 2).unwrap();
        assert_eq!(outside[3], 0);
    }

    #[test]
    fn test_disk_center_opaque() {
        let mut surface = Surface::new(40, 40).unwrap();
        let mut p = Painter::new(&mut surface);
        p.fill_disk(DVec2::new(20.0, 20.0), 5.0, Color::BLACK);
        drop(p);

        assert_eq!(surface.get_rgba8(20, 20).unwrap()[3], 255);
        assert_eq!(surface.get_rgba8(20, 30).unwrap()[3], 0);
    }

    #[test]
    fn test_segment_covers_midpoint() {
        let mut surface = Surface::new(100, 100).unwrap();
        let mut p = Painter::new(&mut surface);
        p.stroke_segment(
            DVec2::new(10.0, 10.0),
            DVec2::new(90.0, 90.0),
            4.0,
            Color::from_rgb(1.0, 0.0, 0.0),
        );
        drop(p);

        let mid = surface.get_rgba8(50, 50).unwrap();
        assert_eq!(mid, [255, 0, 0, 255]);
    }

    #[test]
    fn test_destination_out_erases() {
        let mut surface = Surface::new(50, 50).unwrap();
        surface.fill(Color::from_rgb(0.0, 0.0, 1.0));
        let mut p = Painter::new(&mut surface);
        p.set_composite(CompositeOp::DestinationOut);
        p.stroke_segment(DVec2::new(10.0, 25.0), DVec2::new(40.0, 25.0), 10.0, Color::BLACK);
        drop(p);

        assert_eq!(surface.get_rgba8(25, 25).unwrap()[3], 0);
        assert_eq!(surface.get_rgba8(25, 5).unwrap()[3], 255);
    }

    #[test]
    fn test_transform_applies_to_segment() {
        let mut surface = Surface::new(100, 100).unwrap();
        let mut p = Painter::new(&mut surface);
        p.set_transform(Affine::translation(50.0, 50.0).concat(&Affine::scale(2.0, 2.0)));
        // User-space (0,0)-(10,0) maps to device (50,50)-(70,50)
        p.stroke_segment(DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), 2.0, Color::BLACK);
        drop(p);

        assert_eq!(surface.get_rgba8(60, 50).unwrap()[3], 255);
        assert_eq!(surface.get_rgba8(30, 50).unwrap()[3], 0);
    }

    #[test]
    fn test_clip_restricts_drawing() {
        let mut surface = Surface::new(50, 50).unwrap();
        let mut p = Painter::new(&mut surface);
        p.clip_rect(Rect::new(0.0, 0.0, 20.0, 50.0));
        p.fill_rect(Rect::new(0.0, 0.0, 50.0, 50.0), Color::BLACK);
        drop(p);

        assert_eq!(surface.get_rgba8(10, 10).unwrap()[3], 255);
        assert_eq!(surface.get_rgba8(30, 10).unwrap()[3], 0);
    }

    #[test]
    fn test_draw_surface_identity_is_exact() {
        let mut src = Surface::new(8, 8).unwrap();
        src.set_pixel(3, 3, Color::from_rgb(0.0, 1.0, 0.0));

        let mut dst = Surface::new(8, 8).unwrap();
        let mut p = Painter::new(&mut dst);
        p.draw_surface(&src, 1.0);
        drop(p);

        assert_eq!(dst.get_rgba8(3, 3).unwrap(), [0, 255, 0, 255]);
        assert_eq!(dst.get_rgba8(4, 4).unwrap()[3], 0);
    }

    #[test]
    fn test_save_restore() {
        let mut surface = Surface::new(10, 10).unwrap();
        let mut p = Painter::new(&mut surface);
        p.save();
        p.translate(5.0, 5.0);
        p.set_alpha(0.5);
        p.restore();
        assert_eq!(p.transform(), Affine::IDENTITY);
    }
}
