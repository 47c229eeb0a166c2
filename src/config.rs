//! View controller configuration

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// How pan is clamped against the document rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PanClampMode {
    /// Keep the document inside the margin-reduced viewport; center it
    /// on axes where it is smaller than the viewport
    Margin,
    /// Keep at least `min_visible_px` of the document on screen
    #[default]
    MinVisible,
}

/// How `zoom_document_to_fit` chooses its zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMode {
    /// Whole document visible
    Contain,
    /// Viewport fully covered by the document
    Cover,
    /// Document width matches the available width
    FitWidth,
    /// Document height matches the available height
    FitHeight,
}

/// Screen-pixel margins around the document
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    /// Left margin
    pub left: f64,
    /// Right margin
    pub right: f64,
    /// Top margin
    pub top: f64,
    /// Bottom margin
    pub bottom: f64,
}

impl Margins {
    /// Uniform margins on all sides
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }
}

/// Partial margin update; unset sides keep their value
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MarginsPatch {
    /// New left margin
    pub left: Option<f64>,
    /// New right margin
    pub right: Option<f64>,
    /// New top margin
    pub top: Option<f64>,
    /// New bottom margin
    pub bottom: Option<f64>,
}

/// View controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Minimum zoom factor
    pub min_zoom: f64,
    /// Maximum zoom factor
    pub max_zoom: f64,
    /// Wheel pixels to log-zoom step
    pub wheel_sensitivity: f64,
    /// Zoom easing approach rate (1/ms)
    pub approach_k_zoom: f64,
    /// Reset pan approach rate (1/ms)
    pub approach_k_pan: f64,
    /// Inertia velocity retention per 16 ms
    pub friction: f64,
    /// Velocity below which inertia stops (CSS px/ms)
    pub stop_speed: f64,
    /// EMA factor for drag velocity tracking
    pub ema_alpha: f64,
    /// Idle time after which pointer release carries no inertia (ms)
    pub idle_no_inertia_ms: f64,
    /// Host keeps the surface sized to its parent
    pub auto_resize: bool,
    /// Content background; `None` clears to transparent
    pub background: Option<Color>,
    /// Draw a 1-CSS-pixel border at the document edges
    pub draw_doc_border: bool,
    /// Minimum visible document size for the min-visible clamp (CSS px)
    pub min_visible_px: f64,
    /// Pan clamp policy against the document
    pub pan_clamp_mode: PanClampMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 10.0,
            wheel_sensitivity: 0.0015,
            approach_k_zoom: 0.022,
            approach_k_pan: 0.022,
            friction: 0.92,
            stop_speed: 0.02,
            ema_alpha: 0.25,
            idle_no_inertia_ms: 120.0,
            auto_resize: true,
            background: Some(Color::WHITE),
            draw_doc_border: false,
            min_visible_px: 30.0,
            pan_clamp_mode: PanClampMode::default(),
        }
    }
}

impl ViewConfig {
    /// Pull out-of-range values back into their domains, logging each
    /// adjustment
    pub fn sanitize(&mut self) {
        if !(self.min_zoom > 0.0) {
            log::warn!("min_zoom {} non-positive, raising to 1e-8", self.min_zoom);
            self.min_zoom = 1e-8;
        }
        if self.max_zoom < self.min_zoom {
            log::warn!(
                "max_zoom {} below min_zoom {}, raising to min_zoom",
                self.max_zoom,
                self.min_zoom
            );
            self.max_zoom = self.min_zoom;
        }
        if self.min_visible_px < 0.0 {
            log::warn!("min_visible_px {} negative, clamping to 0", self.min_visible_px);
            self.min_visible_px = 0.0;
        }
        if !(0.0..=1.0).contains(&self.ema_alpha) {
            log::warn!("ema_alpha {} outside [0, 1], clamping", self.ema_alpha);
            self.ema_alpha = self.ema_alpha.clamp(0.0, 1.0);
        }
    }
}
