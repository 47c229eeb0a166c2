//! Input event value types
//!
//! The engine defines what pointer and wheel events must deliver; the
//! host translates its windowing system's events into these and feeds
//! them to the view controller. All coordinates are CSS pixels relative
//! to the surface.

use serde::{Deserialize, Serialize};

/// Unit of a wheel event's delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WheelDeltaMode {
    /// Delta is in pixels
    #[default]
    Pixel,
    /// Delta is in text lines
    Line,
    /// Delta is in pages
    Page,
}

/// A normalized wheel event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    /// Pointer X relative to the surface
    pub x: f64,
    /// Pointer Y relative to the surface
    pub y: f64,
    /// Vertical scroll delta in `mode` units
    pub delta_y: f64,
    /// Unit of `delta_y`
    pub mode: WheelDeltaMode,
    /// Ctrl or Cmd held
    pub ctrl_or_meta: bool,
    /// Shift held
    pub shift: bool,
    /// Line height in pixels for `Line` deltas (16 when unknown)
    pub line_height: Option<f64>,
    /// Page height in pixels for `Page` deltas (800 when unknown)
    pub page_height: Option<f64>,
}

impl WheelEvent {
    /// A plain pixel-delta wheel event without modifiers
    pub fn pixels(x: f64, y: f64, delta_y: f64) -> Self {
        Self {
            x,
            y,
            delta_y,
            mode: WheelDeltaMode::Pixel,
            ctrl_or_meta: false,
            shift: false,
            line_height: None,
            page_height: None,
        }
    }

    /// The delta normalized to pixels
    pub fn delta_pixels(&self) -> f64 {
        match self.mode {
            WheelDeltaMode::Pixel => self.delta_y,
            WheelDeltaMode::Line => self.delta_y * self.line_height.unwrap_or(16.0),
            WheelDeltaMode::Page => self.delta_y * self.page_height.unwrap_or(800.0),
        }
    }
}

/// Which pointer button an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerButton {
    /// Primary button (usually left)
    #[default]
    Primary,
    /// Secondary button (usually right)
    Secondary,
    /// Auxiliary button (usually middle)
    Auxiliary,
    /// Any other button
    Other,
}

/// A pointer event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer X relative to the surface
    pub x: f64,
    /// Pointer Y relative to the surface
    pub y: f64,
    /// X movement since the previous event
    pub movement_x: f64,
    /// Y movement since the previous event
    pub movement_y: f64,
    /// Button the event refers to
    pub button: PointerButton,
    /// Normalized pressure (0.0 - 1.0); 1.0 when the device reports none
    pub pressure: f32,
    /// Event timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl PointerEvent {
    /// A primary-button event at a position and time
    pub fn primary(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self {
            x,
            y,
            movement_x: 0.0,
            movement_y: 0.0,
            button: PointerButton::Primary,
            pressure: 1.0,
            timestamp_ms,
        }
    }

    /// The same event with movement deltas attached
    pub fn with_movement(mut self, dx: f64, dy: f64) -> Self {
        self.movement_x = dx;
        self.movement_y = dy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_normalization() {
        let mut e = WheelEvent::pixels(0.0, 0.0, 100.0);
        assert_eq!(e.delta_pixels(), 100.0);

        e.mode = WheelDeltaMode::Line;
        assert_eq!(e.delta_pixels(), 1600.0);
        e.line_height = Some(20.0);
        assert_eq!(e.delta_pixels(), 2000.0);

        e.mode = WheelDeltaMode::Page;
        e.page_height = None;
        assert_eq!(e.delta_pixels(), 80000.0);
    }

    #[test]
    fn test_pointer_builder() {
        let e = PointerEvent::primary(10.0, 20.0, 5.0).with_movement(3.0, -4.0);
        assert_eq!(e.movement_x, 3.0);
        assert_eq!(e.movement_y, -4.0);
        assert_eq!(e.pressure, 1.0);
    }
}
