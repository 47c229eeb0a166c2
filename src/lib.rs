//! # Easel Core Engine
//!
//! An embeddable 2D canvas viewport engine for raster editing
//! applications, rendered entirely in software.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Easel Core                         │
//! ├──────────┬──────────┬──────────┬──────────┬─────────────┤
//! │   View   │  Layer   │  Layer   │ History  │   Painter   │
//! │Controller│  Model   │  Stacks  │ Manager  │ (software)  │
//! └──────────┴──────────┴──────────┴──────────┴─────────────┘
//! ```
//!
//! ## Features
//!
//! - **Animated camera**: log-space zoom easing, anchored zoom, pan
//!   inertia and document-aware pan clamping
//! - **Two-plane compositing**: world-space content layers and
//!   screen-space overlays blitted onto one final surface
//! - **Raster painting**: pressure-weighted brush and eraser strokes
//!   with round caps, applied live and replayable
//! - **Undo/redo**: bounded command history with region snapshots and
//!   optional stroke merging

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod layer;
pub mod painter;
pub mod stroke;
pub mod surface;
pub mod utils;
pub mod view;

// Re-exports for convenience
pub use camera::{Camera, ViewState};
pub use color::{Color, PixelColor};
pub use config::{FitMode, Margins, MarginsPatch, PanClampMode, ViewConfig};
pub use error::{EngineError, EngineResult};
pub use history::{Command, HistoryManager, StrokeCommand};
pub use input::{PointerButton, PointerEvent, WheelDeltaMode, WheelEvent};
pub use layer::{
    Anchor, BitmapLayer, BlendMode, BrushRingLayer, CanvasLayer, CursorLayer, Layer, LayerKind,
    LayerMeta, LayerSpace, LayerStack, Plane, Pose, Scene, SwatchLayer,
};
pub use painter::{CompositeOp, Painter};
pub use stroke::{BrushMode, StrokeData, StrokePoint};
pub use surface::{PixelRect, PixelRegion, Surface};
pub use view::{DocumentRect, ViewController};

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum supported surface dimension (16K)
pub const MAX_SURFACE_SIZE: u32 = 16384;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_creation() {
        let view = ViewController::with_size(640.0, 480.0);
        assert!(view.is_ok());
    }

    #[test]
    fn test_zero_size_rejected() {
        let view = ViewController::with_size(0.0, 480.0);
        assert!(view.is_err());
    }
}
