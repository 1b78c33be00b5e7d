//! Software stroke rasterizer.
//!
//! Strokes are rendered into a straight-alpha RGBA raster. Each stroke is first
//! stamped into a coverage mask (round-capped capsules per segment, combined
//! with `max` so a stroke never darkens itself) and then composited onto the
//! raster in one step. Eraser strokes use destination-out, so they remove
//! everything painted before them in the same pass, including the ruled lines.
//!
//! Compositing from a saved base image with the accumulated mask gives the same
//! pixels whether the mask was built in one go or segment by segment. The
//! drawing surface relies on this to render live strokes incrementally.

use bevy::prelude::*;
use image::{Rgba, RgbaImage};

use super::stroke::{Rgb, Stroke};
use super::tools::DrawingTool;
use crate::constants::RULED_LINE_SPACING;
use crate::theme::RULED_LINE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Paint over what is already there
    SourceOver,
    /// Subtract coverage from what is already there
    DestinationOut,
}

/// How a stroke's coverage is blended onto the raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub opacity: f32,
    pub mode: CompositeMode,
}

impl StrokeStyle {
    pub fn for_stroke(stroke: &Stroke) -> Self {
        let tool = stroke.tool();
        Self {
            color: stroke.color(),
            opacity: tool.opacity(),
            mode: match tool {
                DrawingTool::Eraser => CompositeMode::DestinationOut,
                _ => CompositeMode::SourceOver,
            },
        }
    }
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Pixel rectangle covering `rect`, clipped to a `width` x `height` image.
    /// Returns `None` when nothing is left after clipping.
    pub fn covering(rect: Rect, width: u32, height: u32) -> Option<Self> {
        let x0 = rect.min.x.floor().max(0.0) as u32;
        let y0 = rect.min.y.floor().max(0.0) as u32;
        let x1 = (rect.max.x.ceil().max(0.0) as u32).min(width);
        let y1 = (rect.max.y.ceil().max(0.0) as u32).min(height);
        (x0 < x1 && y0 < y1).then_some(Self { x0, y0, x1, y1 })
    }

    pub fn union(self, other: PixelRect) -> PixelRect {
        PixelRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    fn pixels(self) -> impl Iterator<Item = (u32, u32)> {
        (self.y0..self.y1).flat_map(move |y| (self.x0..self.x1).map(move |x| (x, y)))
    }
}

/// Merge an optional dirty rect with another
pub fn union_dirty(a: Option<PixelRect>, b: Option<PixelRect>) -> Option<PixelRect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Per-pixel coverage of one stroke, 0.0..=1.0
#[derive(Debug, Clone)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Stamp a round-capped segment of the given stroke width.
    /// Returns the pixels whose coverage may have changed.
    pub fn stamp_segment(&mut self, a: Vec2, b: Vec2, width: f32) -> Option<PixelRect> {
        let radius = width / 2.0;
        // One extra pixel for the antialiased rim
        let reach = Vec2::splat(radius + 1.0);
        let bounds = Rect::from_corners(a.min(b) - reach, a.max(b) + reach);
        let rect = PixelRect::covering(bounds, self.width, self.height)?;

        for (x, y) in rect.pixels() {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let coverage = (radius + 0.5 - distance_to_segment(center, a, b)).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let index = self.index(x, y);
                self.data[index] = self.data[index].max(coverage);
            }
        }
        Some(rect)
    }

    /// Single-point strokes render as a dot
    pub fn stamp_dot(&mut self, point: Vec2, width: f32) -> Option<PixelRect> {
        self.stamp_segment(point, point, width)
    }

    /// Stamp every segment of a stroke
    pub fn stamp_stroke(&mut self, stroke: &Stroke) -> Option<PixelRect> {
        let points = stroke.points();
        match points {
            [] => None,
            [point] => self.stamp_dot(*point, stroke.width()),
            _ => points.windows(2).fold(None, |dirty, pair| {
                union_dirty(dirty, self.stamp_segment(pair[0], pair[1], stroke.width()))
            }),
        }
    }

    pub fn clear_rect(&mut self, rect: PixelRect) {
        for (x, y) in rect.pixels() {
            let index = self.index(x, y);
            self.data[index] = 0.0;
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Blend `alpha` worth of `style` onto one straight-alpha pixel
pub fn composite_pixel(dst: Rgba<u8>, style: &StrokeStyle, alpha: f32) -> Rgba<u8> {
    if alpha <= 0.0 {
        return dst;
    }
    let [dr, dg, db, da] = dst.0;
    let da = da as f32 / 255.0;

    match style.mode {
        CompositeMode::DestinationOut => {
            let out_a = da * (1.0 - alpha);
            Rgba([dr, dg, db, to_byte(out_a * 255.0)])
        }
        CompositeMode::SourceOver => {
            let out_a = alpha + da * (1.0 - alpha);
            if out_a <= 0.0 {
                return Rgba([0, 0, 0, 0]);
            }
            let blend = |src: u8, dst: u8| {
                (src as f32 * alpha + dst as f32 * da * (1.0 - alpha)) / out_a
            };
            Rgba([
                to_byte(blend(style.color.r, dr)),
                to_byte(blend(style.color.g, dg)),
                to_byte(blend(style.color.b, db)),
                to_byte(out_a * 255.0),
            ])
        }
    }
}

fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Write `base` composited with `mask` into `target`, only inside `rect`.
/// `base` is left untouched, so the same region can be recomposited as the
/// mask grows.
pub fn composite_from_base(
    target: &mut RgbaImage,
    base: &RgbaImage,
    mask: &CoverageMask,
    rect: PixelRect,
    style: &StrokeStyle,
) {
    for (x, y) in rect.pixels() {
        let alpha = mask.get(x, y) * style.opacity;
        let pixel = composite_pixel(*base.get_pixel(x, y), style, alpha);
        target.put_pixel(x, y, pixel);
    }
}

/// Composite `mask` directly onto `target` inside `rect`
pub fn composite_in_place(target: &mut RgbaImage, mask: &CoverageMask, rect: PixelRect, style: &StrokeStyle) {
    for (x, y) in rect.pixels() {
        let alpha = mask.get(x, y) * style.opacity;
        if alpha > 0.0 {
            let pixel = composite_pixel(*target.get_pixel(x, y), style, alpha);
            target.put_pixel(x, y, pixel);
        }
    }
}

/// Paint the 1 px ruled lines, every `RULED_LINE_SPACING` rows starting one spacing down
pub fn draw_ruled_lines(raster: &mut RgbaImage) {
    let line = Rgba([RULED_LINE.r, RULED_LINE.g, RULED_LINE.b, 255]);
    let (width, height) = raster.dimensions();
    for y in (RULED_LINE_SPACING..height).step_by(RULED_LINE_SPACING as usize) {
        for x in 0..width {
            raster.put_pixel(x, y, line);
        }
    }
}

/// Render one stroke on top of the raster, using `scratch` as its coverage mask.
/// `scratch` is left empty afterwards.
pub fn render_stroke(raster: &mut RgbaImage, scratch: &mut CoverageMask, stroke: &Stroke) {
    if let Some(rect) = scratch.stamp_stroke(stroke) {
        composite_in_place(raster, scratch, rect, &StrokeStyle::for_stroke(stroke));
        scratch.clear_rect(rect);
    }
}

/// Full repaint: clear, ruled background, then every stroke in commit order
pub fn render_strokes(raster: &mut RgbaImage, scratch: &mut CoverageMask, strokes: &[Stroke]) {
    for pixel in raster.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
    draw_ruled_lines(raster);
    for stroke in strokes {
        render_stroke(raster, scratch, stroke);
    }
}
