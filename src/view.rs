//! View controller
//!
//! Owns the camera, the three drawing surfaces (content, overlay,
//! final), the optional document rectangle with its margins, and the
//! input translation from screen pixels to world coordinates. The host
//! drives [`ViewController::tick`] once per animation frame; each tick
//! advances zoom easing, pan inertia and reset, applies the document
//! pan clamp, and composites the scene:
//!
//! ```text
//! content plane (world transform) ─┐
//!                                  ├─> final surface
//! overlay plane (identity)  ───────┘
//! ```

use glam::DVec2;

use crate::camera::{Camera, ViewState};
use crate::color::{Color, PixelColor};
use crate::config::{FitMode, Margins, MarginsPatch, PanClampMode, ViewConfig};
use crate::error::EngineResult;
use crate::geometry::Rect;
use crate::input::{PointerButton, PointerEvent, WheelEvent};
use crate::layer::Scene;
use crate::painter::Painter;
use crate::surface::Surface;

/// Log-zoom multiplier while Ctrl/Cmd is held on wheel zoom
const WHEEL_CTRL_BOOST: f64 = 1.6;
/// Log-zoom multiplier while Shift is held on wheel zoom
const WHEEL_SHIFT_DAMP: f64 = 0.6;

/// The world-space document rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentRect {
    /// World X of the left edge
    pub x: f64,
    /// World Y of the top edge
    pub y: f64,
    /// Width in world units
    pub width: f64,
    /// Height in world units
    pub height: f64,
}

/// Camera, compositor and input front-end over a drawing surface
pub struct ViewController {
    config: ViewConfig,
    camera: Camera,
    dpr: f64,
    css_width: f64,
    css_height: f64,
    final_surface: Surface,
    content: Surface,
    overlay: Surface,
    document: Option<DocumentRect>,
    margins: Margins,
    pan_enabled: bool,
    zoom_enabled: bool,
    last_tick_ms: Option<f64>,
    last_move_ms: f64,
}

impl ViewController {
    /// Create a controller over a surface of the given CSS-pixel size
    /// and device pixel ratio
    pub fn new(css_width: f64, css_height: f64, dpr: f64, mut config: ViewConfig) -> EngineResult<Self> {
        if !(css_width > 0.0 && css_height > 0.0) {
            return Err(crate::error::EngineError::InvalidSurfaceSize(
                css_width.max(0.0) as u32,
                css_height.max(0.0) as u32,
            ));
        }
        config.sanitize();
        let dpr = if dpr > 0.0 { dpr } else { 1.0 };
        let device_w = ((css_width * dpr).floor() as u32).max(1);
        let device_h = ((css_height * dpr).floor() as u32).max(1);

        let camera = Camera::new(config.min_zoom, config.max_zoom);
        Ok(Self {
            camera,
            dpr,
            css_width,
            css_height,
            final_surface: Surface::new(device_w, device_h)?,
            content: Surface::new(device_w, device_h)?,
            overlay: Surface::new(device_w, device_h)?,
            document: None,
            margins: Margins::default(),
            pan_enabled: true,
            zoom_enabled: true,
            last_tick_ms: None,
            last_move_ms: 0.0,
            config,
        })
    }

    /// Create a controller with the default configuration
    pub fn with_size(css_width: f64, css_height: f64) -> EngineResult<Self> {
        Self::new(css_width, css_height, 1.0, ViewConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Replace the configuration, re-sanitizing and re-clamping zoom
    pub fn set_config(&mut self, mut config: ViewConfig) {
        config.sanitize();
        self.camera.set_zoom_range(config.min_zoom, config.max_zoom);
        self.config = config;
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f64 {
        self.camera.zoom()
    }

    /// Zoom factor the easing approaches
    pub fn target_zoom(&self) -> f64 {
        self.camera.target_zoom()
    }

    /// Current translation in CSS pixels
    pub fn translation(&self) -> (f64, f64) {
        (self.camera.tx, self.camera.ty)
    }

    /// Whether a pointer drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.camera.dragging
    }

    /// Device pixel ratio
    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    /// Surface size in CSS pixels
    pub fn css_size(&self) -> (f64, f64) {
        (self.css_width, self.css_height)
    }

    /// The visible surface the host presents
    pub fn final_surface(&self) -> &Surface {
        &self.final_surface
    }

    /// The content plane (world layers composite here)
    pub fn content_surface(&self) -> &Surface {
        &self.content
    }

    /// The overlay plane
    pub fn overlay_surface(&self) -> &Surface {
        &self.overlay
    }

    /// Camera snapshot for layer rendering and coordinate conversion
    pub fn view_state(&self) -> ViewState {
        ViewState {
            zoom: self.camera.zoom(),
            tx: self.camera.tx,
            ty: self.camera.ty,
            dpr: self.dpr,
            css_width: self.css_width,
            css_height: self.css_height,
        }
    }

    // ----- document -----

    /// Install the world-space document rectangle
    pub fn set_document_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.document = Some(DocumentRect { x, y, width, height });
    }

    /// Remove the document rectangle, disabling pan clamping
    pub fn clear_document_rect(&mut self) {
        self.document = None;
    }

    /// The installed document rectangle, if any
    pub fn document_rect(&self) -> Option<DocumentRect> {
        self.document
    }

    /// Update document margins; unset sides keep their value
    pub fn set_document_margins(&mut self, patch: MarginsPatch) {
        if let Some(left) = patch.left {
            self.margins.left = left;
        }
        if let Some(right) = patch.right {
            self.margins.right = right;
        }
        if let Some(top) = patch.top {
            self.margins.top = top;
        }
        if let Some(bottom) = patch.bottom {
            self.margins.bottom = bottom;
        }
    }

    /// Current document margins
    pub fn document_margins(&self) -> Margins {
        self.margins
    }

    /// Select the pan clamp policy
    pub fn set_pan_clamp_mode(&mut self, mode: PanClampMode) {
        self.config.pan_clamp_mode = mode;
    }

    // ----- interaction gates -----

    /// Enable or disable pan interaction. Disabling terminates any
    /// in-flight drag and zeroes inertia.
    pub fn set_pan_enabled(&mut self, enabled: bool) {
        self.pan_enabled = enabled;
        if !enabled {
            self.camera.dragging = false;
            self.camera.vx = 0.0;
            self.camera.vy = 0.0;
        }
    }

    /// Enable or disable zoom interaction
    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        self.zoom_enabled = enabled;
    }

    /// Whether pan interaction is enabled
    pub fn pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    /// Whether zoom interaction is enabled
    pub fn zoom_enabled(&self) -> bool {
        self.zoom_enabled
    }

    // ----- zoom -----

    /// Smoothly retarget to absolute zoom `z`, anchored at a CSS point
    pub fn zoom_to_at_screen(&mut self, anchor_x: f64, anchor_y: f64, z: f64) {
        if !(z > 0.0) || !z.is_finite() {
            return;
        }
        self.camera.retarget_zoom(anchor_x, anchor_y, z.ln());
    }

    /// Snap immediately to absolute zoom `z`, anchored at a CSS point,
    /// and apply the document clamp instantly
    pub fn zoom_to_at_screen_raw(&mut self, anchor_x: f64, anchor_y: f64, z: f64) {
        if !(z > 0.0) || !z.is_finite() {
            return;
        }
        self.camera.snap_zoom(anchor_x, anchor_y, z.ln());
        self.apply_doc_clamp();
    }

    /// Multiplicative zoom around a CSS anchor point
    pub fn zoom_by_factor_at_screen(&mut self, anchor_x: f64, anchor_y: f64, factor: f64) {
        if !(factor > 0.0) || !factor.is_finite() {
            return;
        }
        let target = self.camera.target_log_z + factor.ln();
        self.camera.retarget_zoom(anchor_x, anchor_y, target);
    }

    /// Multiplicative zoom around a world anchor point
    pub fn zoom_by_factor_at_world(&mut self, wx: f64, wy: f64, factor: f64) {
        let anchor = self.camera.to_screen(wx, wy);
        self.zoom_by_factor_at_screen(anchor.x, anchor.y, factor);
    }

    /// Snap the zoom so the document fits the margin-reduced viewport
    /// per `mode`, and center the document. No-op without a document.
    pub fn zoom_document_to_fit(&mut self, mode: FitMode) {
        let Some(doc) = self.document else {
            return;
        };
        if doc.width <= 0.0 || doc.height <= 0.0 {
            return;
        }
        let avail_w = self.css_width - self.margins.left - self.margins.right;
        let avail_h = self.css_height - self.margins.top - self.margins.bottom;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return;
        }

        let zx = avail_w / doc.width;
        let zy = avail_h / doc.height;
        let z = match mode {
            FitMode::Contain => zx.min(zy),
            FitMode::Cover => zx.max(zy),
            FitMode::FitWidth => zx,
            FitMode::FitHeight => zy,
        }
        .clamp(self.config.min_zoom, self.config.max_zoom);

        self.camera.current_log_z = self.camera.clamp_log(z.ln());
        self.camera.target_log_z = self.camera.current_log_z;
        let z = self.camera.zoom();

        self.camera.tx = self.margins.left + (avail_w - z * doc.width) / 2.0 - z * doc.x;
        self.camera.ty = self.margins.top + (avail_h - z * doc.height) / 2.0 - z * doc.y;
        self.camera.vx = 0.0;
        self.camera.vy = 0.0;
        log::debug!("fit {:?}: zoom {}, translation ({}, {})", mode, z, self.camera.tx, self.camera.ty);
    }

    /// Ease back to identity (zoom 1, pan 0)
    pub fn reset_smooth(&mut self) {
        self.camera.begin_reset();
    }

    /// Snap back to identity immediately
    pub fn reset_instant(&mut self) {
        self.camera.reset_instant();
    }

    // ----- conversions -----

    /// Convert a CSS-pixel screen point to world coordinates
    pub fn to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let w = self.camera.to_world(x, y);
        (w.x, w.y)
    }

    /// Convert a world point to CSS-pixel screen coordinates
    pub fn to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        let s = self.camera.to_screen(wx, wy);
        (s.x, s.y)
    }

    // ----- pixel reads -----

    /// Read the content plane under a CSS-pixel coordinate.
    /// Out-of-range reads return transparent black.
    pub fn get_pixel_color_at_screen(&self, sx: f64, sy: f64) -> PixelColor {
        let dx = (sx * self.dpr).floor();
        let dy = (sy * self.dpr).floor();
        if dx < 0.0 || dy < 0.0 {
            return PixelColor::transparent();
        }
        match self.content.get_rgba8(dx as u32, dy as u32) {
            Some([r, g, b, a]) => PixelColor::from_rgba8(r, g, b, a),
            None => PixelColor::transparent(),
        }
    }

    /// Read the content plane under a world coordinate
    pub fn get_pixel_color_at_world(&self, wx: f64, wy: f64) -> PixelColor {
        let (sx, sy) = self.to_screen(wx, wy);
        self.get_pixel_color_at_screen(sx, sy)
    }

    // ----- sizing -----

    /// Synchronize the surfaces to a new parent CSS size. The device
    /// dimensions become `floor(css * dpr)`.
    pub fn resize_to_parent(&mut self, parent_css_width: f64, parent_css_height: f64) -> EngineResult<()> {
        self.css_width = parent_css_width;
        self.css_height = parent_css_height;
        let device_w = ((parent_css_width * self.dpr).floor() as u32).max(1);
        let device_h = ((parent_css_height * self.dpr).floor() as u32).max(1);
        self.final_surface.reset_size(device_w, device_h)?;
        // Content and overlay offscreens are matched during the next
        // render pass
        Ok(())
    }

    /// Change the device pixel ratio (display moved between monitors)
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) -> EngineResult<()> {
        if dpr > 0.0 {
            self.dpr = dpr;
            self.resize_to_parent(self.css_width, self.css_height)?;
        }
        Ok(())
    }

    // ----- input -----

    /// Feed a wheel event, retargeting the zoom around the pointer
    pub fn on_wheel(&mut self, event: &WheelEvent) {
        if !self.zoom_enabled {
            return;
        }
        let mut step = -event.delta_pixels() * self.config.wheel_sensitivity;
        if event.ctrl_or_meta {
            step *= WHEEL_CTRL_BOOST;
        }
        if event.shift {
            step *= WHEEL_SHIFT_DAMP;
        }
        if !step.is_finite() {
            return;
        }
        let target = self.camera.target_log_z + step;
        self.camera.retarget_zoom(event.x, event.y, target);
    }

    /// Feed a pointer-down event, starting a pan drag on the primary
    /// button
    pub fn on_pointer_down(&mut self, event: &PointerEvent) {
        if !self.pan_enabled || event.button != PointerButton::Primary {
            return;
        }
        self.camera.dragging = true;
        self.camera.vx = 0.0;
        self.camera.vy = 0.0;
        self.last_move_ms = event.timestamp_ms;
    }

    /// Feed a pointer-move event, panning while a drag is in progress
    pub fn on_pointer_move(&mut self, event: &PointerEvent) {
        if !self.camera.dragging {
            return;
        }
        self.camera.tx += event.movement_x;
        self.camera.ty += event.movement_y;

        let dt = (event.timestamp_ms - self.last_move_ms).max(1.0);
        let alpha = self.config.ema_alpha;
        self.camera.vx = (1.0 - alpha) * self.camera.vx + alpha * (event.movement_x / dt);
        self.camera.vy = (1.0 - alpha) * self.camera.vy + alpha * (event.movement_y / dt);
        self.last_move_ms = event.timestamp_ms;
    }

    /// Feed a pointer-up event, releasing the drag into inertia
    pub fn on_pointer_up(&mut self, event: &PointerEvent) {
        if !self.camera.dragging {
            return;
        }
        self.camera.dragging = false;

        let idle = event.timestamp_ms - self.last_move_ms;
        if idle >= self.config.idle_no_inertia_ms {
            self.camera.vx = 0.0;
            self.camera.vy = 0.0;
        } else if idle > 0.0 {
            let decay = self.config.friction.powf(idle / 16.0);
            self.camera.vx *= decay;
            self.camera.vy *= decay;
        }
        if self.camera.vx.hypot(self.camera.vy) < self.config.stop_speed {
            self.camera.vx = 0.0;
            self.camera.vy = 0.0;
        }
    }

    // ----- the loop -----

    /// Advance one animation tick at `now_ms` and composite the scene
    /// into the final surface
    pub fn tick(&mut self, now_ms: f64, scene: &Scene) {
        let dt = match self.last_tick_ms {
            Some(last) => (now_ms - last).max(1.0),
            None => 1.0,
        };
        self.last_tick_ms = Some(now_ms);

        self.camera.advance_zoom(dt, self.config.approach_k_zoom);
        self.camera
            .advance_inertia(dt, self.config.friction, self.config.stop_speed, self.pan_enabled);
        self.camera.advance_reset(dt, self.config.approach_k_pan);
        self.apply_doc_clamp();
        self.render(scene);
    }

    /// Composite the scene without advancing animations
    pub fn render(&mut self, scene: &Scene) {
        let device_w = self.final_surface.width();
        let device_h = self.final_surface.height();
        if self.content.width() != device_w || self.content.height() != device_h {
            let _ = self.content.reset_size(device_w, device_h);
        }
        if self.overlay.width() != device_w || self.overlay.height() != device_h {
            let _ = self.overlay.reset_size(device_w, device_h);
        }

        let view = self.view_state();

        // Content plane
        {
            let mut painter = Painter::new(&mut self.content);
            match self.config.background {
                Some(color) => painter.fill_all(color.with_alpha(1.0)),
                None => painter.clear(),
            }
            painter.set_transform(view.world_device_transform());
            match self.document {
                Some(doc) => {
                    let doc_rect = Rect::new(doc.x, doc.y, doc.width, doc.height);
                    painter.save();
                    painter.clip_rect(doc_rect);
                    scene.content.render_all(&mut painter, &view);
                    painter.restore();
                    if self.config.draw_doc_border && view.zoom > 0.0 {
                        painter.set_transform(view.world_device_transform());
                        painter.stroke_rect(doc_rect, 1.0 / view.zoom, Color::BLACK);
                    }
                }
                None => scene.content.render_all(&mut painter, &view),
            }
        }

        // Overlay plane
        {
            let mut painter = Painter::new(&mut self.overlay);
            painter.clear();
            painter.set_transform(view.screen_device_transform());
            scene.overlay.render_all(&mut painter, &view);
        }

        // Final blit: content, then overlay on top
        self.final_surface.copy_from(&self.content);
        self.final_surface.blit_over(&self.overlay);
    }

    // ----- document pan clamp -----

    /// Effective min-visible requirement for one axis, sanitized
    /// against the surface extent
    fn min_visible_for(&self, extent: f64) -> f64 {
        let mv = self.config.min_visible_px;
        if mv > extent {
            (extent - 5.0).max(0.0)
        } else {
            mv
        }
    }

    fn apply_doc_clamp(&mut self) {
        let Some(doc) = self.document else {
            return;
        };
        if doc.width <= 0.0 || doc.height <= 0.0 {
            return;
        }
        let z = self.camera.zoom();
        let (w, h) = (self.css_width, self.css_height);
        let doc_l = doc.x;
        let doc_r = doc.x + doc.width;
        let doc_t = doc.y;
        let doc_b = doc.y + doc.height;

        match self.config.pan_clamp_mode {
            PanClampMode::Margin => {
                let m = self.margins;

                let avail_w = w - m.left - m.right;
                if z * doc.width <= avail_w {
                    self.camera.tx = m.left + (avail_w - z * doc.width) / 2.0 - z * doc.x;
                } else {
                    let lo = (w - m.right) - z * doc_r;
                    let hi = m.left - z * doc_l;
                    self.camera.tx = self.camera.tx.clamp(lo, hi);
                }

                let avail_h = h - m.top - m.bottom;
                if z * doc.height <= avail_h {
                    self.camera.ty = m.top + (avail_h - z * doc.height) / 2.0 - z * doc.y;
                } else {
                    let lo = (h - m.bottom) - z * doc_b;
                    let hi = m.top - z * doc_t;
                    self.camera.ty = self.camera.ty.clamp(lo, hi);
                }
            }
            PanClampMode::MinVisible => {
                let min_vis_x = self.min_visible_for(w).min(z * doc.width);
                let lo = min_vis_x - z * doc_r;
                let hi = (w - min_vis_x) - z * doc_l;
                self.camera.tx = if lo <= hi {
                    self.camera.tx.clamp(lo, hi)
                } else {
                    (lo + hi) / 2.0
                };

                let min_vis_y = self.min_visible_for(h).min(z * doc.height);
                let lo = min_vis_y - z * doc_b;
                let hi = (h - min_vis_y) - z * doc_t;
                self.camera.ty = if lo <= hi {
                    self.camera.ty.clamp(lo, hi)
                } else {
                    (lo + hi) / 2.0
                };
            }
        }
    }

    /// Drag the camera by raw CSS-pixel deltas, bypassing input gates.
    /// Meant for host-driven navigation (scrollbars, minimaps); the
    /// document clamp still applies on the next tick.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.camera.tx += dx;
        self.camera.ty += dy;
    }

    /// Center a world point in the viewport
    pub fn center_on(&mut self, wx: f64, wy: f64) {
        let target = DVec2::new(self.css_width / 2.0, self.css_height / 2.0);
        let current = self.camera.to_screen(wx, wy);
        self.camera.tx += target.x - current.x;
        self.camera.ty += target.y - current.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::WheelDeltaMode;

    fn run_ticks(view: &mut ViewController, scene: &Scene, n: usize) {
        let mut now = 0.0;
        for _ in 0..n {
            now += 16.0;
            view.tick(now, scene);
        }
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut view = ViewController::with_size(1000.0, 800.0).unwrap();
        view.zoom_to_at_screen_raw(300.0, 300.0, 2.5);
        let (wx, wy) = view.to_world(123.0, 456.0);
        let (sx, sy) = view.to_screen(wx, wy);
        assert!((sx - 123.0).abs() < 1e-6);
        assert!((sy - 456.0).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_zoom_target_and_anchor() {
        let mut view = ViewController::with_size(1000.0, 1000.0).unwrap();
        view.on_wheel(&WheelEvent::pixels(400.0, 300.0, -100.0));
        let expected = (100.0 * 0.0015f64).exp();
        assert!((view.target_zoom() - expected).abs() < 1e-9);

        // Ctrl boosts the step
        let mut view2 = ViewController::with_size(1000.0, 1000.0).unwrap();
        let mut event = WheelEvent::pixels(400.0, 300.0, -100.0);
        event.ctrl_or_meta = true;
        view2.on_wheel(&event);
        assert!(view2.target_zoom() > view.target_zoom());
    }

    #[test]
    fn test_wheel_line_mode() {
        let mut view = ViewController::with_size(1000.0, 1000.0).unwrap();
        let mut event = WheelEvent::pixels(0.0, 0.0, -3.0);
        event.mode = WheelDeltaMode::Line;
        view.on_wheel(&event);
        let expected = (3.0 * 16.0 * 0.0015f64).exp();
        assert!((view.target_zoom() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_disabled_gates_wheel() {
        let mut view = ViewController::with_size(1000.0, 1000.0).unwrap();
        view.set_zoom_enabled(false);
        view.on_wheel(&WheelEvent::pixels(0.0, 0.0, -100.0));
        assert_eq!(view.target_zoom(), 1.0);
    }

    #[test]
    fn test_drag_pans() {
        let mut view = ViewController::with_size(1000.0, 1000.0).unwrap();
        view.on_pointer_down(&PointerEvent::primary(100.0, 100.0, 0.0));
        assert!(view.is_dragging());
        view.on_pointer_move(&PointerEvent::primary(120.0, 110.0, 16.0).with_movement(20.0, 10.0));
        assert_eq!(view.translation(), (20.0, 10.0));
        view.on_pointer_up(&PointerEvent::primary(120.0, 110.0, 20.0));
        assert!(!view.is_dragging());
    }

    #[test]
    fn test_idle_release_kills_inertia() {
        let mut view = ViewController::with_size(1000.0, 1000.0).unwrap();
        view.on_pointer_down(&PointerEvent::primary(0.0, 0.0, 0.0));
        view.on_pointer_move(&PointerEvent::primary(50.0, 0.0, 16.0).with_movement(50.0, 0.0));
        // Held still for 500 ms before release
        view.on_pointer_up(&PointerEvent::primary(50.0, 0.0, 516.0));

        let scene = Scene::new();
        let (tx_before, _) = view.translation();
        run_ticks(&mut view, &scene, 10);
        let (tx_after, _) = view.translation();
        assert_eq!(tx_before, tx_after);
    }

    #[test]
    fn test_pan_disabled_terminates_drag() {
        let mut view = ViewController::with_size(1000.0, 1000.0).unwrap();
        view.on_pointer_down(&PointerEvent::primary(0.0, 0.0, 0.0));
        view.on_pointer_move(&PointerEvent::primary(50.0, 0.0, 16.0).with_movement(50.0, 0.0));
        view.set_pan_enabled(false);
        assert!(!view.is_dragging());

        // Further moves are ignored
        view.on_pointer_move(&PointerEvent::primary(80.0, 0.0, 32.0).with_movement(30.0, 0.0));
        assert_eq!(view.translation(), (50.0, 0.0));
    }

    #[test]
    fn test_margin_clamp_centers_small_document() {
        let mut view = ViewController::with_size(800.0, 600.0).unwrap();
        view.set_document_rect(0.0, 0.0, 100.0, 100.0);
        view.set_document_margins(MarginsPatch {
            left: Some(50.0),
            right: Some(50.0),
            top: Some(50.0),
            bottom: Some(50.0),
        });
        view.set_pan_clamp_mode(PanClampMode::Margin);
        view.pan_by(12345.0, -9876.0);

        let scene = Scene::new();
        view.tick(16.0, &scene);

        // Document smaller than the viewport: locked to centered
        let (tx, ty) = view.translation();
        assert!((tx - (50.0 + (700.0 - 100.0) / 2.0)).abs() < 1e-9);
        assert!((ty - (50.0 + (500.0 - 100.0) / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fit_contain() {
        let mut view = ViewController::with_size(800.0, 600.0).unwrap();
        view.set_document_rect(0.0, 0.0, 700.0, 700.0);
        view.set_document_margins(MarginsPatch {
            left: Some(50.0),
            right: Some(50.0),
            top: Some(50.0),
            bottom: Some(50.0),
        });
        view.zoom_document_to_fit(FitMode::Contain);

        assert!((view.zoom() - 500.0 / 700.0).abs() < 1e-12);
        let (cx, cy) = view.to_screen(350.0, 350.0);
        assert!((cx - 400.0).abs() < 0.5);
        assert!((cy - 300.0).abs() < 0.5);
    }

    #[test]
    fn test_fit_modes_relative_sizes() {
        let mut view = ViewController::with_size(800.0, 600.0).unwrap();
        view.set_document_rect(0.0, 0.0, 400.0, 100.0);

        view.zoom_document_to_fit(FitMode::Contain);
        let contain = view.zoom();
        view.zoom_document_to_fit(FitMode::Cover);
        let cover = view.zoom();
        view.zoom_document_to_fit(FitMode::FitWidth);
        let fit_w = view.zoom();
        view.zoom_document_to_fit(FitMode::FitHeight);
        let fit_h = view.zoom();

        assert!(contain <= cover);
        assert!((fit_w - 2.0).abs() < 1e-12);
        assert!((fit_h - 6.0).abs() < 1e-12);
        assert_eq!(contain, fit_w.min(fit_h));
        assert_eq!(cover, fit_w.max(fit_h));
    }

    #[test]
    fn test_pixel_read_out_of_range() {
        let view = ViewController::with_size(100.0, 100.0).unwrap();
        assert_eq!(view.get_pixel_color_at_screen(-5.0, 10.0), PixelColor::transparent());
        assert_eq!(view.get_pixel_color_at_screen(500.0, 10.0), PixelColor::transparent());
    }

    #[test]
    fn test_background_fill_read() {
        let mut view = ViewController::with_size(100.0, 100.0).unwrap();
        let scene = Scene::new();
        view.tick(16.0, &scene);
        let px = view.get_pixel_color_at_screen(50.0, 50.0);
        assert_eq!(px.hex, "#ffffff");
        assert_eq!(px.a, 1.0);
    }

    #[test]
    fn test_transparent_background() {
        let mut config = ViewConfig::default();
        config.background = None;
        let mut view = ViewController::new(100.0, 100.0, 1.0, config).unwrap();
        let scene = Scene::new();
        view.tick(16.0, &scene);
        assert_eq!(view.get_pixel_color_at_screen(50.0, 50.0).a, 0.0);
    }

    #[test]
    fn test_resize_to_parent() {
        let mut view = ViewController::new(100.0, 100.0, 2.0, ViewConfig::default()).unwrap();
        assert_eq!(view.final_surface().width(), 200);

        view.resize_to_parent(150.0, 80.0).unwrap();
        assert_eq!(view.final_surface().width(), 300);
        assert_eq!(view.final_surface().height(), 160);

        let scene = Scene::new();
        view.tick(16.0, &scene);
        assert_eq!(view.content_surface().width(), 300);
        assert_eq!(view.overlay_surface().height(), 160);
    }

    #[test]
    fn test_reset_smooth_converges() {
        let mut view = ViewController::with_size(500.0, 500.0).unwrap();
        view.zoom_to_at_screen_raw(100.0, 100.0, 3.0);
        view.pan_by(40.0, -70.0);
        view.reset_smooth();

        let scene = Scene::new();
        run_ticks(&mut view, &scene, 600);
        assert_eq!(view.translation(), (0.0, 0.0));
        assert!((view.zoom() - 1.0).abs() < 1e-9);
    }
}
