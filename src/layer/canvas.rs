//! Paintable raster layer
//!
//! A [`CanvasLayer`] owns an offscreen raster and the live stroke state
//! of interactive painting. Strokes are applied immediately, segment by
//! segment; on completion the whole gesture is committed to the bound
//! history manager as a single [`StrokeCommand`], carrying the
//! pre-stroke pixels of the rectangle it touched.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::camera::ViewState;
use crate::color::Color;
use crate::error::EngineResult;
use crate::history::{HistoryManager, StrokeCommand};
use crate::painter::Painter;
use crate::stroke::{self, BrushMode, StrokeData, StrokePoint};
use crate::surface::{PixelRegion, Surface};
use crate::utils::timestamp_ms;

use super::{Anchor, Layer, LayerKind, LayerMeta, LayerSpace};

/// Procedural redraw callback invoked against the layer's own offscreen
pub type RedrawFn = Box<dyn FnMut(&mut Painter<'_>) + Send>;

/// In-flight stroke bookkeeping, alive between begin and end
struct LiveStroke {
    /// The starting point, folded into the data on the first segment so
    /// its pressure can be backfilled from that sample
    pending_first: StrokePoint,
    data: Option<StrokeData>,
    last: (f32, f32),
    /// Full-offscreen pre-image, cropped to the stroke's bounds on commit
    pre_image: Option<PixelRegion>,
}

/// A world-space layer with an owned raster and stroke primitives
pub struct CanvasLayer {
    meta: LayerMeta,
    raster: Surface,
    redraw: Option<RedrawFn>,
    history: Option<Arc<RwLock<HistoryManager>>>,
    live: Option<LiveStroke>,
}

impl fmt::Debug for CanvasLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasLayer")
            .field("meta", &self.meta)
            .field("width", &self.raster.width())
            .field("height", &self.raster.height())
            .field("drawing", &self.live.is_some())
            .finish()
    }
}

impl CanvasLayer {
    /// Create a new transparent canvas layer
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> EngineResult<Self> {
        Ok(Self {
            meta: LayerMeta::new(name, LayerKind::Canvas, LayerSpace::World),
            raster: Surface::new(width, height)?,
            redraw: None,
            history: None,
            live: None,
        })
    }

    /// Create a layer with a procedural redraw callback, invoking it
    /// once to prime the raster
    pub fn with_redraw(
        name: impl Into<String>,
        width: u32,
        height: u32,
        redraw: RedrawFn,
    ) -> EngineResult<Self> {
        let mut layer = Self::new(name, width, height)?;
        layer.redraw = Some(redraw);
        layer.request_redraw();
        Ok(layer)
    }

    pub(super) fn with_meta(meta: LayerMeta, raster: Surface) -> Self {
        Self {
            meta,
            raster,
            redraw: None,
            history: None,
            live: None,
        }
    }

    /// Raster width in pixels
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Raster height in pixels
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// The layer's offscreen raster
    pub fn raster(&self) -> &Surface {
        &self.raster
    }

    /// Mutable access to the offscreen raster
    pub fn raster_mut(&mut self) -> &mut Surface {
        &mut self.raster
    }

    /// Invoke the procedural redraw callback against the offscreen, if
    /// one was provided
    pub fn request_redraw(&mut self) {
        if let Some(mut redraw) = self.redraw.take() {
            let mut painter = Painter::new(&mut self.raster);
            redraw(&mut painter);
            self.redraw = Some(redraw);
        }
    }

    /// Blit an external image into the offscreen at a local-pixel
    /// rectangle. Omitted dimensions use the source size.
    pub fn draw_image(&mut self, image: &Surface, dx: f64, dy: f64, dw: Option<f64>, dh: Option<f64>) {
        let dw = dw.unwrap_or(image.width() as f64);
        let dh = dh.unwrap_or(image.height() as f64);
        let mut painter = Painter::new(&mut self.raster);
        painter.draw_surface_rect(image, dx, dy, dw, dh);
    }

    /// Bind a history manager for stroke commands.
    ///
    /// Rebinding while a stroke is in flight is refused: the pre-stroke
    /// snapshot was captured against the binding that existed at
    /// `begin_stroke`, so a mid-gesture swap would commit a command
    /// with no pre-image (or lose it outright). The call is ignored
    /// with a warning; rebind after the gesture ends.
    pub fn set_history_manager(&mut self, history: Option<Arc<RwLock<HistoryManager>>>) {
        if self.live.is_some() {
            log::warn!(
                "layer {}: history binding change ignored while a stroke is in flight",
                self.meta.id
            );
            return;
        }
        self.history = history;
    }

    /// The bound history manager, if any
    pub fn history_manager(&self) -> Option<Arc<RwLock<HistoryManager>>> {
        self.history.clone()
    }

    /// Undo the last committed stroke on this layer
    pub fn undo(&mut self) -> bool {
        match self.history.clone() {
            Some(history) => history.write().undo(&mut self.raster),
            None => false,
        }
    }

    /// Redo the last undone stroke on this layer
    pub fn redo(&mut self) -> bool {
        match self.history.clone() {
            Some(history) => history.write().redo(&mut self.raster),
            None => false,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(|h| h.read().can_undo())
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(|h| h.read().can_redo())
    }

    /// Map a world point into local raster coordinates through the
    /// inverse pose
    pub fn to_local(&self, wx: f64, wy: f64) -> (f64, f64) {
        self.meta.pose.to_local(
            wx,
            wy,
            (self.raster.width() as f64, self.raster.height() as f64),
        )
    }

    /// Begin an interactive stroke at a world point.
    ///
    /// Any stroke still in flight is discarded without producing a
    /// command (pointer loss, window blur).
    pub fn begin_stroke(&mut self, wx: f64, wy: f64) {
        if self.live.is_some() {
            log::debug!("begin_stroke with stroke in flight, discarding previous");
        }
        let (lx, ly) = self.to_local(wx, wy);
        let pre_image = self.history.is_some().then(|| self.raster.read_full());
        self.live = Some(LiveStroke {
            pending_first: StrokePoint::new(lx as f32, ly as f32, 1.0),
            data: None,
            last: (lx as f32, ly as f32),
            pre_image,
        });
    }

    /// Extend the interactive stroke to a world point, drawing the
    /// segment immediately.
    ///
    /// A call without a matching `begin_stroke` is a no-op.
    pub fn stroke(&mut self, wx: f64, wy: f64, color: Color, size: f32, pressure: f32, mode: BrushMode) {
        let (lx, ly) = self.to_local(wx, wy);
        let Some(live) = self.live.as_mut() else {
            return;
        };
        let point = StrokePoint::new(lx as f32, ly as f32, pressure);
        let from = StrokePoint::new(live.last.0, live.last.1, point.pressure);

        let pending_first = live.pending_first;
        let data = live.data.get_or_insert_with(|| {
            // First sample: backfill the begin point's pressure from it
            let mut data = StrokeData::new(color, size, mode);
            let mut first = pending_first;
            first.pressure = point.pressure;
            data.push(first);
            data
        });
        data.push(point);

        stroke::draw_segment(&mut self.raster, from, point, data.color, data.size, data.mode);
        live.last = (point.x, point.y);
    }

    /// Finish the interactive stroke, committing one command to the
    /// bound history with a host-supplied timestamp (milliseconds).
    ///
    /// A call without points recorded, or without a matching
    /// `begin_stroke`, commits nothing.
    pub fn end_stroke_at(&mut self, now_ms: f64) {
        let Some(live) = self.live.take() else {
            return;
        };
        let (Some(data), Some(history)) = (live.data, self.history.clone()) else {
            return;
        };
        if data.is_empty() {
            return;
        }
        let command = match live.pre_image {
            Some(pre_image) => StrokeCommand::already_applied(self.meta.id, data, pre_image, now_ms),
            None => {
                // Unreachable while rebinding mid-stroke is refused;
                // surface it loudly rather than losing paint silently
                log::warn!(
                    "layer {}: stroke finished without a pre-image snapshot, no undo entry recorded",
                    self.meta.id
                );
                return;
            }
        };
        history.write().add_command(Box::new(command));
    }

    /// Finish the interactive stroke, timestamping with the wall clock
    pub fn end_stroke(&mut self) {
        self.end_stroke_at(timestamp_ms());
    }

    /// Whether an interactive stroke is in flight
    pub fn is_drawing(&self) -> bool {
        self.live.is_some()
    }

    /// Resize the raster, keeping the top-left pixels and dropping the
    /// rest
    pub fn crop_to(&mut self, width: u32, height: u32) -> EngineResult<()> {
        let keep = self.raster.read_region(crate::surface::PixelRect::new(
            0,
            0,
            width.min(self.raster.width()),
            height.min(self.raster.height()),
        ));
        let mut next = Surface::new(width, height)?;
        next.write_region(0, 0, &keep);
        self.raster = next;
        self.live = None;
        Ok(())
    }

    /// Resize the raster, rescaling the existing pixels bilinearly
    pub fn resize_to(&mut self, width: u32, height: u32) -> EngineResult<()> {
        let mut next = Surface::new(width, height)?;
        {
            let mut painter = Painter::new(&mut next);
            painter.draw_surface_rect(&self.raster, 0.0, 0.0, width as f64, height as f64);
        }
        self.raster = next;
        self.live = None;
        Ok(())
    }

    fn render_raster(&self, painter: &mut Painter<'_>) {
        painter.save();
        painter.translate(self.meta.pose.x, self.meta.pose.y);
        painter.rotate(self.meta.pose.rotation);
        painter.scale(self.meta.pose.scale, self.meta.pose.scale);
        if self.meta.pose.anchor == Anchor::Center {
            painter.translate(
                -(self.raster.width() as f64) / 2.0,
                -(self.raster.height() as f64) / 2.0,
            );
        }
        painter.set_blend(self.meta.blend);
        painter.draw_surface(&self.raster, self.meta.opacity);
        painter.restore();
    }
}

impl Layer for CanvasLayer {
    fn meta(&self) -> &LayerMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut LayerMeta {
        &mut self.meta
    }

    fn render(&self, painter: &mut Painter<'_>, _view: &ViewState) {
        self.render_raster(painter);
    }

    fn hit_test(&self, x: f64, y: f64, _view: Option<&ViewState>) -> bool {
        let (lx, ly) = self.to_local(x, y);
        lx >= 0.0
            && ly >= 0.0
            && lx <= self.raster.width() as f64
            && ly <= self.raster.height() as f64
    }

    fn as_canvas(&self) -> Option<&CanvasLayer> {
        Some(self)
    }

    fn as_canvas_mut(&mut self) -> Option<&mut CanvasLayer> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_with_history(width: u32, height: u32) -> CanvasLayer {
        let mut layer = CanvasLayer::new("test", width, height).unwrap();
        layer.set_history_manager(Some(Arc::new(RwLock::new(HistoryManager::new()))));
        layer
    }

    #[test]
    fn test_stroke_paints_and_undo_restores() {
        let mut layer = layer_with_history(100, 100);
        let red = Color::from_rgb(1.0, 0.0, 0.0);

        layer.begin_stroke(10.0, 10.0);
        layer.stroke(90.0, 90.0, red, 4.0, 1.0, BrushMode::Brush);
        layer.end_stroke_at(0.0);

        let hit = layer.raster().get_rgba8(50, 50).unwrap();
        assert_eq!(hit, [255, 0, 0, 255]);
        assert!(layer.can_undo());

        assert!(layer.undo());
        assert_eq!(layer.raster().get_rgba8(50, 50).unwrap()[3], 0);

        assert!(layer.redo());
        assert_eq!(layer.raster().get_rgba8(50, 50).unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_eraser_stroke() {
        let mut layer = layer_with_history(100, 100);
        layer.raster_mut().fill(Color::from_rgb(0.0, 0.0, 1.0));

        layer.begin_stroke(10.0, 50.0);
        layer.stroke(90.0, 50.0, Color::BLACK, 10.0, 1.0, BrushMode::Eraser);
        layer.end_stroke_at(0.0);

        assert_eq!(layer.raster().get_rgba8(50, 50).unwrap()[3], 0);

        layer.undo();
        assert_eq!(layer.raster().get_rgba8(50, 50).unwrap(), [0, 0, 255, 255]);
    }

    #[test]
    fn test_stroke_without_begin_is_noop() {
        let mut layer = layer_with_history(50, 50);
        layer.stroke(25.0, 25.0, Color::BLACK, 4.0, 1.0, BrushMode::Brush);
        assert_eq!(layer.raster().get_rgba8(25, 25).unwrap()[3], 0);
        assert!(!layer.can_undo());
    }

    #[test]
    fn test_double_end_stroke_is_noop() {
        let mut layer = layer_with_history(50, 50);
        layer.begin_stroke(10.0, 10.0);
        layer.stroke(40.0, 40.0, Color::BLACK, 4.0, 1.0, BrushMode::Brush);
        layer.end_stroke_at(0.0);
        layer.end_stroke_at(1.0);
        assert_eq!(layer.history_manager().unwrap().read().undo_count(), 1);
    }

    #[test]
    fn test_unbind_mid_stroke_is_refused() {
        let mut layer = layer_with_history(50, 50);
        let history = layer.history_manager().unwrap();

        layer.begin_stroke(10.0, 10.0);
        layer.stroke(40.0, 40.0, Color::BLACK, 4.0, 1.0, BrushMode::Brush);
        // Unbinding mid-gesture is ignored; the command still lands
        layer.set_history_manager(None);
        layer.end_stroke_at(0.0);

        assert_eq!(history.read().undo_count(), 1);
        assert!(layer.history_manager().is_some());
    }

    #[test]
    fn test_bind_mid_stroke_is_refused() {
        let mut layer = CanvasLayer::new("late-bind", 50, 50).unwrap();
        let history = Arc::new(RwLock::new(HistoryManager::new()));

        layer.begin_stroke(10.0, 10.0);
        layer.stroke(40.0, 40.0, Color::BLACK, 4.0, 1.0, BrushMode::Brush);
        // No pre-image was captured at begin, so a mid-gesture binding
        // cannot take effect
        layer.set_history_manager(Some(history.clone()));
        layer.end_stroke_at(0.0);

        assert_eq!(history.read().undo_count(), 0);
        assert!(layer.history_manager().is_none());

        // Binding applies cleanly for the next gesture
        layer.set_history_manager(Some(history.clone()));
        layer.begin_stroke(5.0, 5.0);
        layer.stroke(45.0, 5.0, Color::BLACK, 4.0, 1.0, BrushMode::Brush);
        layer.end_stroke_at(1000.0);
        assert_eq!(history.read().undo_count(), 1);
    }

    #[test]
    fn test_abandoned_stroke_produces_no_command() {
        let mut layer = layer_with_history(50, 50);
        layer.begin_stroke(10.0, 10.0);
        layer.stroke(40.0, 40.0, Color::BLACK, 4.0, 1.0, BrushMode::Brush);
        // Pointer lost: a new gesture begins without end_stroke
        layer.begin_stroke(5.0, 5.0);
        layer.end_stroke_at(0.0);
        assert!(!layer.can_undo());
    }

    #[test]
    fn test_stroke_respects_pose() {
        let mut layer = layer_with_history(100, 100);
        layer.meta_mut().pose.x = 100.0;
        layer.meta_mut().pose.y = 100.0;

        layer.begin_stroke(110.0, 150.0);
        layer.stroke(190.0, 150.0, Color::BLACK, 4.0, 1.0, BrushMode::Brush);
        layer.end_stroke_at(0.0);

        // World (150, 150) is local (50, 50)
        assert_eq!(layer.raster().get_rgba8(50, 50).unwrap()[3], 255);
    }

    #[test]
    fn test_hit_test_with_pose() {
        let mut layer = CanvasLayer::new("hit", 100, 50).unwrap();
        layer.meta_mut().pose.x = 10.0;
        layer.meta_mut().pose.y = 20.0;
        assert!(layer.hit_test(50.0, 40.0, None));
        assert!(!layer.hit_test(5.0, 40.0, None));
        assert!(!layer.hit_test(50.0, 90.0, None));
    }

    #[test]
    fn test_crop_keeps_top_left() {
        let mut layer = CanvasLayer::new("crop", 100, 100).unwrap();
        layer.raster_mut().set_pixel(10, 10, Color::WHITE);
        layer.raster_mut().set_pixel(80, 80, Color::WHITE);

        layer.crop_to(50, 50).unwrap();
        assert_eq!(layer.width(), 50);
        assert_eq!(layer.raster().get_rgba8(10, 10).unwrap()[3], 255);
        assert!(layer.raster().get_rgba8(80, 80).is_none());
    }

    #[test]
    fn test_resize_rescales() {
        let mut layer = CanvasLayer::new("resize", 100, 100).unwrap();
        layer.raster_mut().fill(Color::from_rgb(1.0, 0.0, 0.0));

        layer.resize_to(50, 50).unwrap();
        assert_eq!(layer.width(), 50);
        let c = layer.raster().get_rgba8(25, 25).unwrap();
        assert_eq!(c[0], 255);
        assert_eq!(c[3], 255);
    }

    #[test]
    fn test_redraw_callback_primes_raster() {
        let layer = CanvasLayer::with_redraw("procedural", 40, 40, Box::new(|p| {
            p.fill_all(Color::from_rgb(0.0, 1.0, 0.0));
        }))
        .unwrap();
        assert_eq!(layer.raster().get_rgba8(20, 20).unwrap(), [0, 255, 0, 255]);
    }
}
