//! History management
//!
//! Undo/redo as paired command stacks with a size cap. A
//! [`StrokeCommand`] snapshots the pre-image of the bounded rectangle a
//! stroke touches; snapshots above a size threshold are lz4-compressed,
//! which cuts history memory by an order of magnitude for typical
//! strokes.
//!
//! Commands receive their target raster on execute/undo rather than
//! holding a live reference to their layer, so a layer can own its
//! history handle without a reference cycle.

use std::any::Any;
use std::collections::VecDeque;

use uuid::Uuid;

use crate::stroke::StrokeData;
use crate::surface::{PixelRect, PixelRegion, Surface};

/// Default maximum number of undo steps to keep
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Two stroke commands merge when they share brush parameters and land
/// within this many milliseconds of each other
const MERGE_WINDOW_MS: f64 = 100.0;

/// Compress snapshots larger than this many bytes
const COMPRESS_THRESHOLD: usize = 1024;

/// A reversible action against a layer raster
pub trait Command: Send + Sync {
    /// Apply the command to the target raster. Idempotent: calling on an
    /// already-executed command is a no-op.
    fn execute(&mut self, target: &mut Surface);

    /// Revert the command on the target raster. No-op when the command
    /// has not been executed.
    fn undo(&mut self, target: &mut Surface);

    /// Whether `other` can be folded into this command
    fn can_merge(&self, _other: &dyn Command) -> bool {
        false
    }

    /// Fold `other` into this command. Only called after `can_merge`
    /// returned true.
    fn merge(&mut self, _other: Box<dyn Command>) {}

    /// Short description for logs
    fn label(&self) -> &str {
        "command"
    }

    /// Downcasting support for merge probing
    fn as_any(&self) -> &dyn Any;

    /// Consuming downcast for merging
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A pre-image snapshot, optionally lz4-compressed
#[derive(Debug, Clone)]
struct Snapshot {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
    compressed: bool,
}

impl Snapshot {
    fn from_region(region: PixelRegion) -> Self {
        if region.data.len() > COMPRESS_THRESHOLD {
            Self {
                width: region.width,
                height: region.height,
                bytes: lz4_flex::compress_prepend_size(&region.data),
                compressed: true,
            }
        } else {
            Self {
                width: region.width,
                height: region.height,
                bytes: region.data,
                compressed: false,
            }
        }
    }

    fn to_region(&self) -> Option<PixelRegion> {
        let data = if self.compressed {
            lz4_flex::decompress_size_prepended(&self.bytes).ok()?
        } else {
            self.bytes.clone()
        };
        Some(PixelRegion {
            width: self.width,
            height: self.height,
            data,
        })
    }
}

/// One stroke with the pre-image of the rectangle it touches
struct StrokePart {
    stroke: StrokeData,
    /// Affected rectangle; covers the whole layer in the degenerate case
    rect: PixelRect,
    /// True when the bounding box collapsed and the part fell back to a
    /// full-layer snapshot
    full_fallback: bool,
    snapshot: Option<Snapshot>,
}

/// A stroke with its pre-image, replayable and revertible.
///
/// Merged commands keep their constituent strokes as ordered parts, so
/// undoing or replaying a merged command is pixel-identical to undoing
/// or replaying the individual commands in sequence.
pub struct StrokeCommand {
    layer_id: Uuid,
    parts: Vec<StrokePart>,
    executed: bool,
    timestamp_ms: f64,
}

impl StrokeCommand {
    /// Bounding rectangle of a stroke: points grown by the maximum brush
    /// radius, padded by 2 pixels, clipped to the layer. `None` when the
    /// result is empty or fully outside.
    fn compute_bbox(stroke: &StrokeData, width: u32, height: u32) -> Option<PixelRect> {
        let (min_x, min_y, max_x, max_y) = stroke.inked_bounds()?;
        PixelRect::from_bounds_clipped(
            min_x - 2.0,
            min_y - 2.0,
            max_x + 2.0,
            max_y + 2.0,
            width,
            height,
        )
    }

    /// Create a command for a stroke that has not been applied yet.
    ///
    /// The pre-image is captured on first execute.
    pub fn new(layer_id: Uuid, stroke: StrokeData, layer_width: u32, layer_height: u32, timestamp_ms: f64) -> Self {
        let (rect, full_fallback) = match Self::compute_bbox(&stroke, layer_width, layer_height) {
            Some(rect) => (rect, false),
            None => (PixelRect::full(layer_width, layer_height), true),
        };
        Self {
            layer_id,
            parts: vec![StrokePart {
                stroke,
                rect,
                full_fallback,
                snapshot: None,
            }],
            executed: false,
            timestamp_ms,
        }
    }

    /// Create a command for a live-drawn stroke whose pixels are already
    /// on the layer. `pre_image` is the full-offscreen snapshot taken at
    /// `begin_stroke`; it is cropped to the bounding rectangle here.
    pub fn already_applied(
        layer_id: Uuid,
        stroke: StrokeData,
        pre_image: PixelRegion,
        timestamp_ms: f64,
    ) -> Self {
        let width = pre_image.width;
        let height = pre_image.height;
        let (rect, full_fallback) = match Self::compute_bbox(&stroke, width, height) {
            Some(rect) => (rect, false),
            None => (PixelRect::full(width, height), true),
        };
        let cropped = if full_fallback {
            pre_image
        } else {
            pre_image.crop(rect)
        };
        Self {
            layer_id,
            parts: vec![StrokePart {
                stroke,
                rect,
                full_fallback,
                snapshot: Some(Snapshot::from_region(cropped)),
            }],
            executed: true,
            timestamp_ms,
        }
    }

    /// The layer this stroke targets
    pub fn layer_id(&self) -> Uuid {
        self.layer_id
    }

    /// The stroke data this command replays; merged commands expose
    /// their first constituent here
    pub fn stroke(&self) -> &StrokeData {
        &self.parts[0].stroke
    }

    /// All constituent strokes, in application order
    pub fn strokes(&self) -> impl Iterator<Item = &StrokeData> {
        self.parts.iter().map(|p| &p.stroke)
    }

    /// Timestamp used by the merge window
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }
}

impl Command for StrokeCommand {
    fn execute(&mut self, target: &mut Surface) {
        if self.executed {
            return;
        }
        for part in &mut self.parts {
            if part.snapshot.is_none() {
                let region = if part.full_fallback {
                    target.read_full()
                } else {
                    target.read_region(part.rect)
                };
                part.snapshot = Some(Snapshot::from_region(region));
            }
            part.stroke.replay(target);
        }
        self.executed = true;
    }

    fn undo(&mut self, target: &mut Surface) {
        if !self.executed {
            return;
        }
        // Newest parts restore first, so overlapping regions unwind to
        // the oldest pre-image
        for part in self.parts.iter().rev() {
            let origin = if part.full_fallback { (0, 0) } else { (part.rect.x, part.rect.y) };
            match part.snapshot.as_ref().and_then(Snapshot::to_region) {
                Some(region) => target.write_region(origin.0, origin.1, &region),
                None => {
                    // Snapshot unavailable: degrade to clearing the
                    // affected rectangle rather than failing the undo
                    log::warn!("stroke undo without snapshot, clearing affected region");
                    if part.full_fallback {
                        target.clear();
                    } else {
                        target.clear_region(part.rect);
                    }
                }
            }
        }
        self.executed = false;
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        let Some(other) = other.as_any().downcast_ref::<StrokeCommand>() else {
            return false;
        };
        let mine = &self.parts[self.parts.len() - 1].stroke;
        let theirs = &other.parts[0].stroke;
        self.layer_id == other.layer_id
            && mine.color == theirs.color
            && mine.size == theirs.size
            && mine.mode == theirs.mode
            && (other.timestamp_ms - self.timestamp_ms).abs() <= MERGE_WINDOW_MS
    }

    fn merge(&mut self, other: Box<dyn Command>) {
        if let Ok(other) = other.into_any().downcast::<StrokeCommand>() {
            self.timestamp_ms = other.timestamp_ms;
            self.parts.extend(other.parts);
        }
    }

    fn label(&self) -> &str {
        "stroke"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Paired undo/redo stacks with a size cap and optional merging
pub struct HistoryManager {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: VecDeque<Box<dyn Command>>,
    max_size: usize,
}

impl HistoryManager {
    /// Create a history manager with the default cap
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_HISTORY)
    }

    /// Create a history manager with a custom cap (minimum 1)
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_size: max_size.max(1),
        }
    }

    /// Execute a fresh command against the target and record it
    pub fn execute_command(&mut self, mut cmd: Box<dyn Command>, target: &mut Surface) {
        cmd.execute(target);
        self.push(cmd);
    }

    /// Record a command whose effect is already applied (live-drawn
    /// strokes land here)
    pub fn add_command(&mut self, cmd: Box<dyn Command>) {
        self.push(cmd);
    }

    fn push(&mut self, cmd: Box<dyn Command>) {
        self.redo_stack.clear();

        if let Some(top) = self.undo_stack.back_mut() {
            if top.can_merge(cmd.as_ref()) {
                log::trace!("merging {} into previous command", cmd.label());
                top.merge(cmd);
                return;
            }
        }

        self.undo_stack.push_back(cmd);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Undo the most recent command. Returns false when the stack is
    /// empty.
    pub fn undo(&mut self, target: &mut Surface) -> bool {
        match self.undo_stack.pop_back() {
            Some(mut cmd) => {
                cmd.undo(target);
                self.redo_stack.push_back(cmd);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone command. Returns false when the
    /// stack is empty.
    pub fn redo(&mut self, target: &mut Surface) -> bool {
        match self.redo_stack.pop_back() {
            Some(mut cmd) => {
                cmd.execute(target);
                self.undo_stack.push_back(cmd);
                true
            }
            None => false,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable commands
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable commands
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Change the cap (minimum 1), trimming the oldest entries if needed
    pub fn set_max_history_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// The current cap
    pub fn max_history_size(&self) -> usize {
        self.max_size
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::stroke::{BrushMode, StrokePoint};

    fn stroke_at(y: f32, color: Color) -> StrokeData {
        let mut s = StrokeData::new(color, 4.0, BrushMode::Brush);
        s.push(StrokePoint::new(10.0, y, 1.0));
        s.push(StrokePoint::new(90.0, y, 1.0));
        s
    }

    #[test]
    fn test_execute_undo_redo_cycle() {
        let mut target = Surface::new(100, 100).unwrap();
        let mut history = HistoryManager::new();
        let layer = Uuid::new_v4();

        let cmd = StrokeCommand::new(layer, stroke_at(50.0, Color::BLACK), 100, 100, 0.0);
        history.execute_command(Box::new(cmd), &mut target);

        assert_eq!(target.get_rgba8(50, 50).unwrap()[3], 255);
        assert!(history.can_undo());

        assert!(history.undo(&mut target));
        assert_eq!(target.get_rgba8(50, 50).unwrap()[3], 0);
        assert!(history.can_redo());

        assert!(history.redo(&mut target));
        assert_eq!(target.get_rgba8(50, 50).unwrap()[3], 255);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut target = Surface::new(10, 10).unwrap();
        let mut history = HistoryManager::new();
        assert!(!history.undo(&mut target));
        assert!(!history.redo(&mut target));
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut target = Surface::new(100, 100).unwrap();
        let mut history = HistoryManager::with_max_size(3);
        let layer = Uuid::new_v4();

        for i in 0..5 {
            let cmd = StrokeCommand::new(layer, stroke_at(10.0 + i as f32 * 15.0, Color::BLACK), 100, 100, i as f64 * 1000.0);
            history.execute_command(Box::new(cmd), &mut target);
        }
        assert_eq!(history.undo_count(), 3);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut target = Surface::new(100, 100).unwrap();
        let mut history = HistoryManager::new();
        let layer = Uuid::new_v4();

        history.execute_command(
            Box::new(StrokeCommand::new(layer, stroke_at(20.0, Color::BLACK), 100, 100, 0.0)),
            &mut target,
        );
        history.undo(&mut target);
        assert_eq!(history.redo_count(), 1);

        history.execute_command(
            Box::new(StrokeCommand::new(layer, stroke_at(60.0, Color::BLACK), 100, 100, 5000.0)),
            &mut target,
        );
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_merge_within_window() {
        let mut target = Surface::new(100, 100).unwrap();
        let mut history = HistoryManager::new();
        let layer = Uuid::new_v4();

        history.execute_command(
            Box::new(StrokeCommand::new(layer, stroke_at(20.0, Color::BLACK), 100, 100, 0.0)),
            &mut target,
        );
        history.execute_command(
            Box::new(StrokeCommand::new(layer, stroke_at(40.0, Color::BLACK), 100, 100, 50.0)),
            &mut target,
        );
        assert_eq!(history.undo_count(), 1);

        // One undo reverts both strokes
        history.undo(&mut target);
        assert_eq!(target.get_rgba8(50, 20).unwrap()[3], 0);
        assert_eq!(target.get_rgba8(50, 40).unwrap()[3], 0);

        // And redo brings both back
        history.redo(&mut target);
        assert_eq!(target.get_rgba8(50, 20).unwrap()[3], 255);
        assert_eq!(target.get_rgba8(50, 40).unwrap()[3], 255);
    }

    #[test]
    fn test_no_merge_outside_window_or_other_color() {
        let mut target = Surface::new(100, 100).unwrap();
        let mut history = HistoryManager::new();
        let layer = Uuid::new_v4();

        history.execute_command(
            Box::new(StrokeCommand::new(layer, stroke_at(20.0, Color::BLACK), 100, 100, 0.0)),
            &mut target,
        );
        history.execute_command(
            Box::new(StrokeCommand::new(layer, stroke_at(40.0, Color::BLACK), 100, 100, 500.0)),
            &mut target,
        );
        let red = Color::from_rgb(1.0, 0.0, 0.0);
        history.execute_command(
            Box::new(StrokeCommand::new(layer, stroke_at(60.0, red), 100, 100, 510.0)),
            &mut target,
        );
        assert_eq!(history.undo_count(), 3);
    }

    #[test]
    fn test_degenerate_bbox_falls_back_to_full_layer() {
        let mut target = Surface::new(50, 50).unwrap();
        target.fill(Color::from_rgb(0.0, 0.0, 1.0));

        // Entirely outside the raster
        let mut s = StrokeData::new(Color::BLACK, 4.0, BrushMode::Brush);
        s.push(StrokePoint::new(500.0, 500.0, 1.0));

        let mut cmd = StrokeCommand::new(Uuid::new_v4(), s, 50, 50, 0.0);
        cmd.execute(&mut target);
        cmd.undo(&mut target);
        assert_eq!(target.get_rgba8(25, 25).unwrap(), [0, 0, 255, 255]);
    }

    #[test]
    fn test_set_max_size_trims() {
        let mut target = Surface::new(100, 100).unwrap();
        let mut history = HistoryManager::new();
        let layer = Uuid::new_v4();
        for i in 0..5 {
            history.execute_command(
                Box::new(StrokeCommand::new(layer, stroke_at(10.0 + i as f32 * 15.0, Color::BLACK), 100, 100, i as f64 * 1000.0)),
                &mut target,
            );
        }
        history.set_max_history_size(0);
        assert_eq!(history.max_history_size(), 1);
        assert_eq!(history.undo_count(), 1);
    }
}
