//! Sample overlay layers
//!
//! Ready-made decoration layers for the overlay plane: a bitmap pointer
//! cursor, a brush-radius ring and a color swatch. Hosts are free to
//! implement their own [`Layer`] types instead; these cover the common
//! painter chrome.

use glam::DVec2;

use crate::camera::ViewState;
use crate::color::Color;
use crate::geometry::Rect;
use crate::painter::Painter;
use crate::surface::Surface;

use super::{Layer, LayerKind, LayerMeta, LayerSpace};

/// A screen-space bitmap cursor following the pointer
pub struct CursorLayer {
    meta: LayerMeta,
    image: Surface,
    hotspot: (f64, f64),
    position: (f64, f64),
}

impl CursorLayer {
    /// Create a cursor layer from an image and its hotspot offset
    pub fn new(name: impl Into<String>, image: Surface, hotspot: (f64, f64)) -> Self {
        Self {
            meta: LayerMeta::new(name, LayerKind::Overlay, LayerSpace::Screen),
            image,
            hotspot,
            position: (0.0, 0.0),
        }
    }

    /// Move the cursor to a CSS-pixel screen position
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = (x, y);
    }
}

impl Layer for CursorLayer {
    fn meta(&self) -> &LayerMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut LayerMeta {
        &mut self.meta
    }

    fn render(&self, painter: &mut Painter<'_>, _view: &ViewState) {
        painter.save();
        painter.translate(
            self.position.0 - self.hotspot.0,
            self.position.1 - self.hotspot.1,
        );
        painter.draw_surface(&self.image, self.meta.opacity);
        painter.restore();
    }

    fn hit_test(&self, x: f64, y: f64, _view: Option<&ViewState>) -> bool {
        x >= self.position.0 - self.hotspot.0
            && x <= self.position.0 - self.hotspot.0 + self.image.width() as f64
            && y >= self.position.1 - self.hotspot.1
            && y <= self.position.1 - self.hotspot.1 + self.image.height() as f64
    }
}

/// A brush-radius ring around the pointer.
///
/// The ring lives on the overlay plane but uses world coordinates, so
/// it tracks the painted spot while the camera moves; its line width is
/// `1/zoom` world units, which renders one CSS pixel at any zoom.
pub struct BrushRingLayer {
    meta: LayerMeta,
    center: DVec2,
    /// Ring radius in world units (brush radius at layer scale 1)
    radius: f64,
    color: Color,
}

impl BrushRingLayer {
    /// Create a ring with the given world radius
    pub fn new(name: impl Into<String>, radius: f64) -> Self {
        Self {
            meta: LayerMeta::new(name, LayerKind::Overlay, LayerSpace::World),
            center: DVec2::ZERO,
            radius,
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.8),
        }
    }

    /// Move the ring center to a world point
    pub fn set_center_world(&mut self, wx: f64, wy: f64) {
        self.center = DVec2::new(wx, wy);
    }

    /// Move the ring center to the world point under a CSS-pixel screen
    /// position
    pub fn set_center_screen(&mut self, view: &ViewState, sx: f64, sy: f64) {
        let (wx, wy) = view.to_world(sx, sy);
        self.set_center_world(wx, wy);
    }

    /// Set the ring radius in world units
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    /// Set the ring color
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl Layer for BrushRingLayer {
    fn meta(&self) -> &LayerMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut LayerMeta {
        &mut self.meta
    }

    fn render(&self, painter: &mut Painter<'_>, view: &ViewState) {
        let line_width = if view.zoom > 0.0 { 1.0 / view.zoom } else { 1.0 };
        painter.save();
        painter.set_alpha(self.meta.opacity);
        painter.stroke_circle(self.center, self.radius, line_width, self.color);
        painter.restore();
    }

    fn hit_test(&self, x: f64, y: f64, _view: Option<&ViewState>) -> bool {
        (DVec2::new(x, y) - self.center).length() <= self.radius
    }
}

/// A fixed screen-space color square (active-color indicator)
pub struct SwatchLayer {
    meta: LayerMeta,
    rect: Rect,
    color: Color,
}

impl SwatchLayer {
    /// Create a swatch at a CSS-pixel rectangle
    pub fn new(name: impl Into<String>, rect: Rect, color: Color) -> Self {
        Self {
            meta: LayerMeta::new(name, LayerKind::Overlay, LayerSpace::Screen),
            rect,
            color,
        }
    }

    /// Change the displayed color
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl Layer for SwatchLayer {
    fn meta(&self) -> &LayerMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut LayerMeta {
        &mut self.meta
    }

    fn render(&self, painter: &mut Painter<'_>, _view: &ViewState) {
        painter.save();
        painter.set_alpha(self.meta.opacity);
        painter.fill_rect(self.rect, self.color);
        painter.restore();
    }

    fn hit_test(&self, x: f64, y: f64, _view: Option<&ViewState>) -> bool {
        self.rect.contains(DVec2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        ViewState {
            zoom: 2.0,
            tx: 0.0,
            ty: 0.0,
            dpr: 1.0,
            css_width: 200.0,
            css_height: 200.0,
        }
    }

    #[test]
    fn test_ring_tracks_screen_point() {
        let mut ring = BrushRingLayer::new("ring", 10.0);
        ring.set_center_screen(&view(), 100.0, 60.0);
        assert!(ring.hit_test(50.0, 30.0, None));
    }

    #[test]
    fn test_ring_renders_hairline_any_zoom() {
        let mut surface = Surface::new(200, 200).unwrap();
        let mut ring = BrushRingLayer::new("ring", 20.0);
        ring.set_center_world(50.0, 50.0);

        let v = view();
        let mut painter = Painter::new(&mut surface);
        painter.set_transform(v.world_device_transform());
        ring.render(&mut painter, &v);
        drop(painter);

        // World (50, 70) is on the ring, device (100, 140)
        assert!(surface.get_rgba8(100, 140).unwrap()[3] > 0);
        // Ring interior stays empty
        assert_eq!(surface.get_rgba8(100, 100).unwrap()[3], 0);
    }

    #[test]
    fn test_cursor_hit() {
        let image = Surface::new(16, 16).unwrap();
        let mut cursor = CursorLayer::new("cursor", image, (8.0, 8.0));
        cursor.set_position(100.0, 100.0);
        assert!(cursor.hit_test(100.0, 100.0, None));
        assert!(!cursor.hit_test(120.0, 100.0, None));
    }

    #[test]
    fn test_swatch_renders() {
        let mut surface = Surface::new(100, 100).unwrap();
        let swatch = SwatchLayer::new(
            "swatch",
            Rect::new(10.0, 10.0, 20.0, 20.0),
            Color::from_rgb(1.0, 0.0, 0.0),
        );
        let v = ViewState {
            zoom: 1.0,
            tx: 0.0,
            ty: 0.0,
            dpr: 1.0,
            css_width: 100.0,
            css_height: 100.0,
        };
        let mut painter = Painter::new(&mut surface);
        painter.set_transform(v.screen_device_transform());
        swatch.render(&mut painter, &v);
        drop(painter);

        assert_eq!(surface.get_rgba8(20, 20).unwrap(), [255, 0, 0, 255]);
    }
}
