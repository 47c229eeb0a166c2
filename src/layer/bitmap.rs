//! Image-backed layer
//!
//! A [`BitmapLayer`] is a canvas layer primed from a decoded image. The
//! factory constructors reject on decode failure and no layer is
//! produced; `set_source` replaces both raster dimensions and content.

use std::path::Path;

use image::GenericImageView;

use crate::camera::ViewState;
use crate::error::EngineResult;
use crate::painter::Painter;
use crate::surface::{PixelRegion, Surface};

use super::{CanvasLayer, Layer, LayerKind, LayerMeta, LayerSpace};

/// Convert a decoded image into a surface
fn surface_from_image(image: &image::DynamicImage) -> EngineResult<Surface> {
    let (width, height) = image.dimensions();
    let mut surface = Surface::new(width, height)?;
    let rgba = image.to_rgba8();
    surface.write_region(
        0,
        0,
        &PixelRegion {
            width,
            height,
            data: rgba.into_raw(),
        },
    );
    Ok(surface)
}

/// A canvas layer whose raster is primed from an image source
pub struct BitmapLayer {
    inner: CanvasLayer,
}

impl BitmapLayer {
    /// Create from a pre-decoded image
    pub fn from_image(name: impl Into<String>, image: &image::DynamicImage) -> EngineResult<Self> {
        let raster = surface_from_image(image)?;
        let meta = LayerMeta::new(name, LayerKind::Bitmap, LayerSpace::World);
        Ok(Self {
            inner: CanvasLayer::with_meta(meta, raster),
        })
    }

    /// Decode from encoded bytes (PNG, JPEG, WebP)
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> EngineResult<Self> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(name, &image)
    }

    /// Decode from a file on disk
    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> EngineResult<Self> {
        let image = image::open(path)?;
        Self::from_image(name, &image)
    }

    /// Replace raster dimensions and content from a new source
    pub fn set_source(&mut self, image: &image::DynamicImage) -> EngineResult<()> {
        *self.inner.raster_mut() = surface_from_image(image)?;
        Ok(())
    }

    /// The underlying canvas layer
    pub fn inner(&self) -> &CanvasLayer {
        &self.inner
    }

    /// Mutable access to the underlying canvas layer
    pub fn inner_mut(&mut self) -> &mut CanvasLayer {
        &mut self.inner
    }
}

impl Layer for BitmapLayer {
    fn meta(&self) -> &LayerMeta {
        self.inner.meta()
    }

    fn meta_mut(&mut self) -> &mut LayerMeta {
        self.inner.meta_mut()
    }

    fn render(&self, painter: &mut Painter<'_>, view: &ViewState) {
        self.inner.render(painter, view);
    }

    fn hit_test(&self, x: f64, y: f64, view: Option<&ViewState>) -> bool {
        self.inner.hit_test(x, y, view)
    }

    fn as_canvas(&self) -> Option<&CanvasLayer> {
        Some(&self.inner)
    }

    fn as_canvas_mut(&mut self) -> Option<&mut CanvasLayer> {
        Some(&mut self.inner)
    }
}
