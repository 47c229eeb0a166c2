//! Layer system
//!
//! Layers are drawable entities with a pose (translation, rotation,
//! scale, anchor), visibility, opacity and a blend mode. World-space
//! layers live on the content plane under the camera transform;
//! screen-space layers render with the identity transform, typically on
//! the overlay plane.

mod bitmap;
pub mod blend;
mod canvas;
mod overlay;
mod stack;

pub use bitmap::BitmapLayer;
pub use blend::BlendMode;
pub use canvas::{CanvasLayer, RedrawFn};
pub use overlay::{BrushRingLayer, CursorLayer, SwatchLayer};
pub use stack::{LayerStack, Plane, Scene};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::ViewState;
use crate::geometry::Affine;
use crate::painter::Painter;

/// The coordinate space a layer renders in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerSpace {
    /// World coordinates, under the camera transform
    #[default]
    World,
    /// CSS-pixel screen coordinates, identity transform
    Screen,
}

/// Anchor point for a layer's pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Anchor {
    /// Pose origin at the raster's top-left corner
    #[default]
    TopLeft,
    /// Pose origin at the raster's center
    Center,
}

/// Layer type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Paintable raster layer
    Canvas,
    /// Raster layer primed from an image
    Bitmap,
    /// Decoration layer (cursor, ring, swatch, ...)
    Overlay,
}

/// A layer's placement in its space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X translation
    pub x: f64,
    /// Y translation
    pub y: f64,
    /// Uniform scale, must stay positive
    pub scale: f64,
    /// Rotation in radians
    pub rotation: f64,
    /// Anchor mode
    pub anchor: Anchor,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            anchor: Anchor::TopLeft,
        }
    }
}

impl Pose {
    /// The forward transform of this pose (translate, then rotate, then
    /// scale), without the anchor offset
    pub fn transform(&self) -> Affine {
        Affine::translation(self.x, self.y)
            .concat(&Affine::rotation(self.rotation))
            .concat(&Affine::scale(self.scale, self.scale))
    }

    /// Map a point from the pose's outer space into local coordinates.
    ///
    /// `anchor_size` is the raster size the anchor offset refers to; for
    /// `Anchor::Center` the local origin sits at the raster center.
    pub fn to_local(&self, x: f64, y: f64, anchor_size: (f64, f64)) -> (f64, f64) {
        let dx = x - self.x;
        let dy = y - self.y;
        let cos = (-self.rotation).cos();
        let sin = (-self.rotation).sin();
        let rx = dx * cos - dy * sin;
        let ry = dx * sin + dy * cos;
        let s = if self.scale > 0.0 { self.scale } else { 1.0 };
        let mut lx = rx / s;
        let mut ly = ry / s;
        if self.anchor == Anchor::Center {
            lx += anchor_size.0 / 2.0;
            ly += anchor_size.1 / 2.0;
        }
        (lx, ly)
    }
}

/// Shared layer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerMeta {
    /// Stable unique identifier
    pub id: Uuid,
    /// Human-readable name
    pub name: String,
    /// Layer type tag
    pub kind: LayerKind,
    /// Coordinate space
    pub space: LayerSpace,
    /// Layer visibility
    pub visible: bool,
    /// Layer opacity (0.0 - 1.0)
    pub opacity: f32,
    /// Blend mode against the plane below
    pub blend: BlendMode,
    /// Placement in the layer's space
    pub pose: Pose,
}

impl LayerMeta {
    /// Create metadata with defaults for the given kind and space
    pub fn new(name: impl Into<String>, kind: LayerKind, space: LayerSpace) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            space,
            visible: true,
            opacity: 1.0,
            blend: BlendMode::Normal,
            pose: Pose::default(),
        }
    }

    /// Whether the layer should be skipped during render
    pub fn is_skipped(&self) -> bool {
        !self.visible || self.opacity <= 0.0
    }
}

/// A drawable entity on one of the two planes.
///
/// `render` is called with the painter's transform already set for the
/// layer's space; implementations save, apply their own pose, set alpha
/// and composite state, emit imagery and restore.
pub trait Layer: Send {
    /// Shared metadata
    fn meta(&self) -> &LayerMeta;

    /// Mutable shared metadata
    fn meta_mut(&mut self) -> &mut LayerMeta;

    /// Draw the layer into the destination
    fn render(&self, painter: &mut Painter<'_>, view: &ViewState);

    /// Test a point (in the layer's space) against the layer
    fn hit_test(&self, _x: f64, _y: f64, _view: Option<&ViewState>) -> bool {
        false
    }

    /// Probe for a paintable raster layer
    fn as_canvas(&self) -> Option<&CanvasLayer> {
        None
    }

    /// Mutable probe for a paintable raster layer
    fn as_canvas_mut(&mut self) -> Option<&mut CanvasLayer> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_to_local_identity() {
        let pose = Pose::default();
        let (lx, ly) = pose.to_local(10.0, 20.0, (100.0, 100.0));
        assert_eq!((lx, ly), (10.0, 20.0));
    }

    #[test]
    fn test_pose_to_local_translated_scaled() {
        let pose = Pose {
            x: 10.0,
            y: 10.0,
            scale: 2.0,
            ..Pose::default()
        };
        let (lx, ly) = pose.to_local(30.0, 50.0, (0.0, 0.0));
        assert_eq!((lx, ly), (10.0, 20.0));
    }

    #[test]
    fn test_pose_to_local_center_anchor() {
        let pose = Pose {
            anchor: Anchor::Center,
            ..Pose::default()
        };
        let (lx, ly) = pose.to_local(0.0, 0.0, (100.0, 60.0));
        assert_eq!((lx, ly), (50.0, 30.0));
    }

    #[test]
    fn test_pose_roundtrip_through_transform() {
        let pose = Pose {
            x: 5.0,
            y: -3.0,
            scale: 1.5,
            rotation: 0.6,
            anchor: Anchor::TopLeft,
        };
        let t = pose.transform();
        let p = t.transform_point(glam::DVec2::new(7.0, 11.0));
        let (lx, ly) = pose.to_local(p.x, p.y, (0.0, 0.0));
        assert!((lx - 7.0).abs() < 1e-9);
        assert!((ly - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_meta_skip() {
        let mut meta = LayerMeta::new("test", LayerKind::Canvas, LayerSpace::World);
        assert!(!meta.is_skipped());
        meta.opacity = 0.0;
        assert!(meta.is_skipped());
        meta.opacity = 1.0;
        meta.visible = false;
        assert!(meta.is_skipped());
    }
}
