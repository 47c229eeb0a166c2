//! Ordered layer containers
//!
//! A [`LayerStack`] holds the layers of one plane in draw order (front
//! is last) and drives their rendering and top-first hit testing. A
//! [`Scene`] pairs the content and overlay stacks the view controller
//! composites every tick.

use uuid::Uuid;

use crate::camera::ViewState;
use crate::error::{EngineError, EngineResult};
use crate::painter::Painter;

use super::{CanvasLayer, Layer, LayerSpace};

/// The rendering plane a stack belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// World content under the camera transform
    Content,
    /// Screen-space decorations over the content
    Overlay,
}

/// Ordered container of layers for a single plane
pub struct LayerStack {
    plane: Plane,
    layers: Vec<Box<dyn Layer>>,
}

impl LayerStack {
    /// Create an empty stack for a plane
    pub fn new(plane: Plane) -> Self {
        Self {
            plane,
            layers: Vec::new(),
        }
    }

    /// The plane this stack renders on
    pub fn plane(&self) -> Plane {
        self.plane
    }

    /// Insert a layer, appending unless a valid position is given.
    /// Returns the layer's id.
    pub fn add_layer(&mut self, layer: Box<dyn Layer>, insert_at: Option<usize>) -> Uuid {
        let id = layer.meta().id;
        match insert_at {
            Some(index) if index <= self.layers.len() => self.layers.insert(index, layer),
            _ => self.layers.push(layer),
        }
        log::debug!("layer {} added to {:?} plane", id, self.plane);
        id
    }

    /// Remove and drop a layer. No-op when absent.
    pub fn remove_layer(&mut self, id: Uuid) -> bool {
        match self.layers.iter().position(|l| l.meta().id == id) {
            Some(index) => {
                self.layers.remove(index);
                log::debug!("layer {} removed from {:?} plane", id, self.plane);
                true
            }
            None => false,
        }
    }

    /// Look up a layer by id
    pub fn get_layer(&self, id: Uuid) -> Option<&dyn Layer> {
        self.layers
            .iter()
            .find(|l| l.meta().id == id)
            .map(|l| l.as_ref())
    }

    /// Look up a layer by id, mutably
    pub fn get_layer_mut(&mut self, id: Uuid) -> Option<&mut (dyn Layer + '_)> {
        self.layers
            .iter_mut()
            .find(|l| l.meta().id == id)
            .map(|l| &mut **l as &mut (dyn Layer + '_))
    }

    /// Look up a paintable layer by id
    pub fn get_canvas_mut(&mut self, id: Uuid) -> Option<&mut CanvasLayer> {
        self.layers
            .iter_mut()
            .find(|l| l.meta().id == id)
            .and_then(|l| l.as_canvas_mut())
    }

    /// Snapshot of all layers in draw order
    pub fn all_layers(&self) -> Vec<&dyn Layer> {
        self.layers.iter().map(|l| l.as_ref()).collect()
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the stack holds no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Move a layer to a new position in draw order
    pub fn move_layer(&mut self, id: Uuid, new_index: usize) -> EngineResult<()> {
        let current = self
            .layers
            .iter()
            .position(|l| l.meta().id == id)
            .ok_or(EngineError::LayerNotFound(id))?;
        if new_index >= self.layers.len() {
            return Err(EngineError::LayerIndexOutOfBounds(new_index, self.layers.len()));
        }
        let layer = self.layers.remove(current);
        self.layers.insert(new_index, layer);
        Ok(())
    }

    /// Move a layer one step toward the front
    pub fn move_layer_up(&mut self, id: Uuid) -> EngineResult<()> {
        let current = self
            .layers
            .iter()
            .position(|l| l.meta().id == id)
            .ok_or(EngineError::LayerNotFound(id))?;
        if current < self.layers.len() - 1 {
            self.layers.swap(current, current + 1);
        }
        Ok(())
    }

    /// Move a layer one step toward the back
    pub fn move_layer_down(&mut self, id: Uuid) -> EngineResult<()> {
        let current = self
            .layers
            .iter()
            .position(|l| l.meta().id == id)
            .ok_or(EngineError::LayerNotFound(id))?;
        if current > 0 {
            self.layers.swap(current, current - 1);
        }
        Ok(())
    }

    /// Duplicate a canvas layer's raster and metadata under a fresh id.
    ///
    /// The redraw callback and history binding are not carried over.
    pub fn duplicate_canvas_layer(&mut self, id: Uuid) -> EngineResult<Uuid> {
        let source = self
            .layers
            .iter()
            .find(|l| l.meta().id == id)
            .and_then(|l| l.as_canvas())
            .ok_or(EngineError::LayerNotFound(id))?;

        let mut meta = source.meta().clone();
        meta.id = Uuid::new_v4();
        meta.name = format!("{} Copy", meta.name);
        let copy = CanvasLayer::with_meta(meta, source.raster().clone());
        Ok(self.add_layer(Box::new(copy), None))
    }

    /// Render all visible layers in order.
    ///
    /// Each layer gets the base transform of its space before `render`
    /// runs: the camera transform for world layers, DPR-only identity
    /// for screen layers. The painter's clip survives across layers.
    pub fn render_all(&self, painter: &mut Painter<'_>, view: &ViewState) {
        for layer in &self.layers {
            if layer.meta().is_skipped() {
                continue;
            }
            painter.save();
            match layer.meta().space {
                LayerSpace::World => painter.set_transform(view.world_device_transform()),
                LayerSpace::Screen => painter.set_transform(view.screen_device_transform()),
            }
            layer.render(painter, view);
            painter.restore();
        }
    }

    /// Top-first hit test against layers of the given space. Returns
    /// the topmost hit layer's id.
    pub fn hit_test(&self, x: f64, y: f64, space: LayerSpace, view: Option<&ViewState>) -> Option<Uuid> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.meta().space == space)
            .find(|l| l.hit_test(x, y, view))
            .map(|l| l.meta().id)
    }

    /// Drop all layers
    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

/// The two planes the view controller composites
pub struct Scene {
    /// World content layers
    pub content: LayerStack,
    /// Screen decorations
    pub overlay: LayerStack,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            content: LayerStack::new(Plane::Content),
            overlay: LayerStack::new(Plane::Overlay),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
