//! The drawing surface: pointer gestures in, strokes and pixels out.
//!
//! `DrawingSurface` owns the history, the in-progress stroke and the raster
//! the canvas texture is uploaded from. Pointer moves only recomposite the
//! pixels touched by the new segment; everything that can change the
//! composition of older strokes (undo, redo, clear, restore, resize) repaints
//! from the committed history.

use std::sync::Arc;

use bevy::prelude::*;
use image::RgbaImage;

use super::history::DrawingHistory;
use super::raster::{composite_from_base, render_strokes, CoverageMask, StrokeStyle};
use super::snapshot::{DrawingSnapshot, RecognizedRegion};
use super::stroke::{Rgb, Stroke};
use super::tools::DrawingTool;
use crate::constants::DEFAULT_STROKE_WIDTH;
use crate::theme::DEFAULT_INK;

/// Tool, color and width applied to the next stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub tool: DrawingTool,
    pub color: Rgb,
    pub width: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: DrawingTool::default(),
            color: DEFAULT_INK,
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Stroke being drawn, with the raster as it was before the stroke started
struct LiveStroke {
    stroke: Stroke,
    base: RgbaImage,
    mask: CoverageMask,
}

#[derive(Resource)]
pub struct DrawingSurface {
    brush: BrushSettings,
    history: DrawingHistory,
    live: Option<LiveStroke>,
    raster: RgbaImage,
    scratch: CoverageMask,
    regions: Arc<Vec<RecognizedRegion>>,
    /// Set whenever `raster` changed since the texture was last uploaded
    needs_upload: bool,
}

impl DrawingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut surface = Self {
            brush: BrushSettings::default(),
            history: DrawingHistory::default(),
            live: None,
            raster: RgbaImage::new(width, height),
            scratch: CoverageMask::new(width, height),
            regions: Arc::new(Vec::new()),
            needs_upload: true,
        };
        surface.render();
        surface
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Start a stroke with the current brush. Ignored while a stroke is already in progress.
    pub fn pointer_down(&mut self, point: Vec2) -> bool {
        if self.live.is_some() {
            return false;
        }

        let stroke = match Stroke::begin(self.brush.tool, self.brush.color, self.brush.width, point) {
            Ok(stroke) => stroke,
            Err(e) => {
                warn!("Ignoring pointer down: {}", e);
                return false;
            }
        };

        self.history.clear_redo();

        let mut live = LiveStroke {
            stroke,
            base: self.raster.clone(),
            mask: CoverageMask::new(self.raster.width(), self.raster.height()),
        };
        if let Some(rect) = live.mask.stamp_dot(point, live.stroke.width()) {
            let style = StrokeStyle::for_stroke(&live.stroke);
            composite_from_base(&mut self.raster, &live.base, &live.mask, rect, &style);
        }
        self.live = Some(live);
        self.needs_upload = true;
        true
    }

    /// Extend the live stroke and recomposite only the new segment
    pub fn pointer_move(&mut self, point: Vec2) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        let Some(last) = live.stroke.last_point() else {
            return;
        };
        if last == point || !point.is_finite() {
            return;
        }

        live.stroke.extend(point);
        if let Some(rect) = live.mask.stamp_segment(last, point, live.stroke.width()) {
            let style = StrokeStyle::for_stroke(&live.stroke);
            composite_from_base(&mut self.raster, &live.base, &live.mask, rect, &style);
            self.needs_upload = true;
        }
    }

    /// Finish the live stroke and commit it. `None` when nothing was being drawn.
    pub fn pointer_up(&mut self) -> Option<DrawingSnapshot> {
        let live = self.live.take()?;
        // The raster already holds the stroke exactly as a full repaint would draw it
        self.history.commit(live.stroke);
        Some(self.snapshot())
    }

    /// Leaving the canvas ends the gesture like a release
    pub fn pointer_leave(&mut self) -> Option<DrawingSnapshot> {
        self.pointer_up()
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Option<DrawingSnapshot> {
        if !self.history.undo() {
            return None;
        }
        self.render();
        Some(self.snapshot())
    }

    pub fn redo(&mut self) -> Option<DrawingSnapshot> {
        if !self.history.redo() {
            return None;
        }
        self.render();
        Some(self.snapshot())
    }

    /// Empty both history stacks and repaint the background
    pub fn clear(&mut self) -> Option<DrawingSnapshot> {
        if !self.history.clear() {
            return None;
        }
        self.render();
        Some(self.snapshot())
    }

    /// Replace the committed strokes, dropping any stroke in progress
    pub fn restore(&mut self, strokes: Vec<Stroke>) -> DrawingSnapshot {
        self.live = None;
        self.history.restore(strokes);
        self.render();
        self.snapshot()
    }

    // ------------------------------------------------------------------
    // Brush
    // ------------------------------------------------------------------

    pub fn set_tool(&mut self, tool: DrawingTool) {
        self.brush.tool = tool;
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.brush.color = color;
    }

    /// Non-positive or non-finite widths are ignored
    pub fn set_width(&mut self, width: f32) -> bool {
        if !width.is_finite() || width <= 0.0 {
            warn!("Ignoring invalid stroke width {}", width);
            return false;
        }
        self.brush.width = width;
        true
    }

    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.set_tool(brush.tool);
        self.set_color(brush.color);
        self.set_width(brush.width);
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Reallocate the raster for a new canvas size. Stroke coordinates are kept as-is.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        if self.raster.dimensions() == (width, height) {
            return false;
        }
        self.raster = RgbaImage::new(width, height);
        self.scratch = CoverageMask::new(width, height);
        self.render();
        true
    }

    /// Full repaint from committed history, then the live stroke on top
    pub fn render(&mut self) {
        render_strokes(&mut self.raster, &mut self.scratch, self.history.committed());

        if let Some(live) = self.live.as_mut() {
            live.base = self.raster.clone();
            live.mask = CoverageMask::new(self.raster.width(), self.raster.height());
            if let Some(rect) = live.mask.stamp_stroke(&live.stroke) {
                let style = StrokeStyle::for_stroke(&live.stroke);
                composite_from_base(&mut self.raster, &live.base, &live.mask, rect, &style);
            }
        }
        self.needs_upload = true;
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    /// Returns true once per raster change
    pub fn take_needs_upload(&mut self) -> bool {
        std::mem::take(&mut self.needs_upload)
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    // ------------------------------------------------------------------
    // Snapshots and recognition
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> DrawingSnapshot {
        DrawingSnapshot {
            revision: self.history.revision(),
            strokes: self.history.committed_shared(),
            regions: Arc::clone(&self.regions),
            width: self.width(),
            height: self.height(),
        }
    }

    /// Install recognizer output for `revision`. Results for an older revision are dropped.
    pub fn apply_regions(&mut self, revision: u64, regions: Vec<RecognizedRegion>) -> Option<DrawingSnapshot> {
        if revision != self.history.revision() {
            debug!(
                "Dropping recognition for revision {} (current {})",
                revision,
                self.history.revision()
            );
            return None;
        }
        self.regions = Arc::new(regions);
        Some(self.snapshot())
    }

    #[cfg(test)]
    pub fn regions(&self) -> &[RecognizedRegion] {
        &self.regions
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[cfg(test)]
    pub fn history(&self) -> &DrawingHistory {
        &self.history
    }

    pub fn committed(&self) -> &[Stroke] {
        self.history.committed()
    }

    #[cfg(test)]
    pub fn live_stroke(&self) -> Option<&Stroke> {
        self.live.as_ref().map(|live| &live.stroke)
    }

    pub fn is_drawing(&self) -> bool {
        self.live.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True while either history stack holds strokes
    pub fn can_clear(&self) -> bool {
        self.can_undo() || self.can_redo()
    }
}
