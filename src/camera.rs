//! Camera state and easing math
//!
//! The camera stores zoom as a logarithm so exponential easing behaves
//! uniformly across the zoom range, plus the CSS-pixel translation, the
//! anchor of an in-flight zoom and the pan-inertia velocities. The view
//! controller drives [`Camera::advance_zoom`] and friends once per
//! animation tick.

use glam::DVec2;

use crate::geometry::Affine;

/// Snapshot of the camera handed to layers during render and hit tests.
///
/// All fields are in CSS pixels except `dpr`, which scales CSS to
/// device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Current zoom factor (`exp(current_log_z)`)
    pub zoom: f64,
    /// X translation in CSS pixels
    pub tx: f64,
    /// Y translation in CSS pixels
    pub ty: f64,
    /// Device pixel ratio
    pub dpr: f64,
    /// Surface width in CSS pixels
    pub css_width: f64,
    /// Surface height in CSS pixels
    pub css_height: f64,
}

impl ViewState {
    /// Convert a CSS-pixel screen point to world coordinates
    pub fn to_world(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.tx) / self.zoom, (y - self.ty) / self.zoom)
    }

    /// Convert a world point to CSS-pixel screen coordinates
    pub fn to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (wx * self.zoom + self.tx, wy * self.zoom + self.ty)
    }

    /// World-to-device transform for content rendering
    pub fn world_device_transform(&self) -> Affine {
        let s = self.dpr * self.zoom;
        Affine {
            matrix: [s, 0.0, 0.0, s, self.dpr * self.tx, self.dpr * self.ty],
        }
    }

    /// Screen-to-device transform (identity up to DPR) for overlay and
    /// screen-space layers
    pub fn screen_device_transform(&self) -> Affine {
        Affine::scale(self.dpr, self.dpr)
    }
}

/// Animated camera over the world plane
#[derive(Debug, Clone)]
pub struct Camera {
    /// Current zoom, as a natural logarithm
    pub current_log_z: f64,
    /// Target zoom the easing approaches, as a natural logarithm
    pub target_log_z: f64,
    /// X translation in CSS pixels
    pub tx: f64,
    /// Y translation in CSS pixels
    pub ty: f64,
    /// Zoom anchor X in CSS pixels
    pub anchor_x: f64,
    /// Zoom anchor Y in CSS pixels
    pub anchor_y: f64,
    /// Pan inertia velocity X in CSS px/ms
    pub vx: f64,
    /// Pan inertia velocity Y in CSS px/ms
    pub vy: f64,
    /// A pointer drag is in progress
    pub dragging: bool,
    /// A smooth reset is in progress
    pub resetting: bool,
    min_log_z: f64,
    max_log_z: f64,
}

impl Camera {
    /// Create a camera at identity with the given zoom range
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        let mut cam = Self {
            current_log_z: 0.0,
            target_log_z: 0.0,
            tx: 0.0,
            ty: 0.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            vx: 0.0,
            vy: 0.0,
            dragging: false,
            resetting: false,
            min_log_z: 0.0,
            max_log_z: 0.0,
        };
        cam.set_zoom_range(min_zoom, max_zoom);
        cam
    }

    /// Set the zoom range; non-positive minimums are lifted to a tiny
    /// positive floor so the logarithm stays finite
    pub fn set_zoom_range(&mut self, min_zoom: f64, max_zoom: f64) {
        let min = if min_zoom > 0.0 { min_zoom } else { 1e-8 };
        let max = max_zoom.max(min);
        self.min_log_z = min.ln();
        self.max_log_z = max.ln();
        self.current_log_z = self.clamp_log(self.current_log_z);
        self.target_log_z = self.clamp_log(self.target_log_z);
    }

    /// Clamp a log-zoom into the configured range
    pub fn clamp_log(&self, log_z: f64) -> f64 {
        log_z.clamp(self.min_log_z, self.max_log_z)
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f64 {
        self.current_log_z.exp()
    }

    /// Zoom factor the easing approaches
    pub fn target_zoom(&self) -> f64 {
        self.target_log_z.exp()
    }

    /// Retarget the zoom, anchored at a CSS-pixel screen point.
    /// Non-finite targets are ignored.
    pub fn retarget_zoom(&mut self, anchor_x: f64, anchor_y: f64, log_z: f64) {
        if !log_z.is_finite() {
            return;
        }
        self.anchor_x = anchor_x;
        self.anchor_y = anchor_y;
        self.target_log_z = self.clamp_log(log_z);
    }

    /// Snap both current and target zoom, keeping the world point under
    /// the anchor fixed. Non-finite targets are ignored.
    pub fn snap_zoom(&mut self, anchor_x: f64, anchor_y: f64, log_z: f64) {
        if !log_z.is_finite() {
            return;
        }
        let new_log = self.clamp_log(log_z);
        let ratio = (new_log - self.current_log_z).exp();
        self.tx = anchor_x - (anchor_x - self.tx) * ratio;
        self.ty = anchor_y - (anchor_y - self.ty) * ratio;
        self.current_log_z = new_log;
        self.target_log_z = new_log;
    }

    /// Advance the zoom easing by `dt` milliseconds with approach rate
    /// `k` (1/ms), applying anchor compensation.
    ///
    /// The compensation runs even when the zoom did not move, which
    /// keeps numerics stable across repeated ticks.
    pub fn advance_zoom(&mut self, dt: f64, k: f64) {
        let alpha = 1.0 - (-k * dt).exp();
        let z_prev = self.current_log_z.exp();
        self.current_log_z += (self.target_log_z - self.current_log_z) * alpha;
        let z_now = self.current_log_z.exp();

        let ratio = z_now / z_prev;
        self.tx = self.anchor_x - (self.anchor_x - self.tx) * ratio;
        self.ty = self.anchor_y - (self.anchor_y - self.ty) * ratio;
    }

    /// Advance pan inertia by `dt` milliseconds.
    ///
    /// `friction` is the per-16-ms velocity retention factor and
    /// `stop_speed` the CSS px/ms threshold below which velocity snaps
    /// to zero.
    pub fn advance_inertia(&mut self, dt: f64, friction: f64, stop_speed: f64, pan_enabled: bool) {
        if self.dragging {
            return;
        }
        if !pan_enabled {
            self.vx = 0.0;
            self.vy = 0.0;
            return;
        }
        self.tx += self.vx * dt;
        self.ty += self.vy * dt;

        let decay = friction.powf(dt / 16.0);
        self.vx *= decay;
        self.vy *= decay;
        if self.vx.hypot(self.vy) < stop_speed {
            self.vx = 0.0;
            self.vy = 0.0;
        }
    }

    /// Advance a smooth reset by `dt` milliseconds with approach rate
    /// `k`, snapping to identity when close enough
    pub fn advance_reset(&mut self, dt: f64, k: f64) {
        if !self.resetting {
            return;
        }
        let beta = 1.0 - (-k * dt).exp();
        self.tx -= self.tx * beta;
        self.ty -= self.ty * beta;

        if self.current_log_z.abs() < 1e-3 && self.tx.abs() < 0.5 && self.ty.abs() < 0.5 {
            self.current_log_z = 0.0;
            self.target_log_z = 0.0;
            self.tx = 0.0;
            self.ty = 0.0;
            self.resetting = false;
        }
    }

    /// Begin a smooth reset toward identity
    pub fn begin_reset(&mut self) {
        self.resetting = true;
        self.target_log_z = self.clamp_log(0.0);
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Snap to identity immediately
    pub fn reset_instant(&mut self) {
        self.current_log_z = self.clamp_log(0.0);
        self.target_log_z = self.current_log_z;
        self.tx = 0.0;
        self.ty = 0.0;
        self.vx = 0.0;
        self.vy = 0.0;
        self.resetting = false;
    }

    /// Convert a CSS-pixel screen point to world coordinates
    pub fn to_world(&self, x: f64, y: f64) -> DVec2 {
        let z = self.zoom();
        DVec2::new((x - self.tx) / z, (y - self.ty) / z)
    }

    /// Convert a world point to CSS-pixel screen coordinates
    pub fn to_screen(&self, wx: f64, wy: f64) -> DVec2 {
        let z = self.zoom();
        DVec2::new(wx * z + self.tx, wy * z + self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_range_clamp() {
        let mut cam = Camera::new(0.5, 10.0);
        cam.retarget_zoom(0.0, 0.0, 100.0f64.ln());
        assert!((cam.target_zoom() - 10.0).abs() < 1e-9);

        cam.retarget_zoom(0.0, 0.0, 0.001f64.ln());
        assert!((cam.target_zoom() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_min_zoom_floored() {
        let cam = Camera::new(0.0, 10.0);
        assert!(cam.min_log_z.is_finite());
    }

    #[test]
    fn test_non_finite_target_ignored() {
        let mut cam = Camera::new(0.5, 10.0);
        cam.retarget_zoom(0.0, 0.0, f64::NAN);
        assert_eq!(cam.target_log_z, 0.0);
    }

    #[test]
    fn test_roundtrip() {
        let mut cam = Camera::new(0.5, 10.0);
        cam.tx = 123.4;
        cam.ty = -56.7;
        cam.current_log_z = 1.3;

        let w = cam.to_world(250.0, 310.0);
        let s = cam.to_screen(w.x, w.y);
        assert!((s.x - 250.0).abs() < 1e-6);
        assert!((s.y - 310.0).abs() < 1e-6);
    }

    #[test]
    fn test_anchor_invariance_under_easing() {
        let mut cam = Camera::new(0.5, 10.0);
        cam.retarget_zoom(500.0, 500.0, 2.0f64.ln());

        let before = cam.to_world(500.0, 500.0);
        for _ in 0..200 {
            cam.advance_zoom(16.0, 0.022);
        }
        let after = cam.to_world(500.0, 500.0);

        assert!((before.x - after.x).abs() < 1e-6);
        assert!((before.y - after.y).abs() < 1e-6);
        assert!((cam.zoom() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_snap_zoom_keeps_anchor() {
        let mut cam = Camera::new(0.5, 10.0);
        let before = cam.to_world(100.0, 200.0);
        cam.snap_zoom(100.0, 200.0, 3.0f64.ln());
        let after = cam.to_world(100.0, 200.0);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((cam.zoom() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_inertia_decays_to_rest() {
        let mut cam = Camera::new(0.5, 10.0);
        cam.vx = 1.0;
        cam.vy = 0.5;
        for _ in 0..1000 {
            cam.advance_inertia(16.0, 0.92, 0.02, true);
        }
        assert_eq!(cam.vx, 0.0);
        assert_eq!(cam.vy, 0.0);
        assert!(cam.tx > 0.0);
    }

    #[test]
    fn test_reset_converges() {
        let mut cam = Camera::new(0.5, 10.0);
        cam.tx = 400.0;
        cam.ty = -300.0;
        cam.current_log_z = 0.8;
        cam.begin_reset();
        for _ in 0..500 {
            cam.advance_zoom(16.0, 0.022);
            cam.advance_reset(16.0, 0.022);
        }
        assert_eq!(cam.tx, 0.0);
        assert_eq!(cam.ty, 0.0);
        assert_eq!(cam.current_log_z, 0.0);
        assert!(!cam.resetting);
    }
}
