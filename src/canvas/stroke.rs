//! Stroke model: one continuous freehand gesture.
//!
//! A stroke's tool, color and width are fixed when it begins. Only its points
//! grow while it is in progress; once finalized it never changes again and is
//! shared by value with anything that needs a snapshot.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tools::DrawingTool;

/// An 8-bit RGB ink color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrokeError {
    #[error("stroke point ({0}, {1}) is not finite")]
    NonFinitePoint(f32, f32),
    #[error("stroke width {0} must be positive")]
    InvalidWidth(f32),
}

fn finalized_on_load() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    tool: DrawingTool,
    color: Rgb,
    width: f32,
    points: Vec<Vec2>,
    /// Strokes read back from disk are always finished gestures
    #[serde(skip, default = "finalized_on_load")]
    finalized: bool,
}

impl Stroke {
    /// Start a new in-progress stroke anchored at `point`
    pub fn begin(tool: DrawingTool, color: Rgb, width: f32, point: Vec2) -> Result<Self, StrokeError> {
        if !point.is_finite() {
            return Err(StrokeError::NonFinitePoint(point.x, point.y));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(StrokeError::InvalidWidth(width));
        }

        Ok(Self {
            tool,
            color,
            width,
            points: vec![point],
            finalized: false,
        })
    }

    /// Append a point. Finalized strokes and non-finite points are ignored.
    pub fn extend(&mut self, point: Vec2) {
        if self.finalized || !point.is_finite() {
            return;
        }
        self.points.push(point);
    }

    /// Mark the stroke immutable. Single-point strokes are valid and render as a dot.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn tool(&self) -> DrawingTool {
        self.tool
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn last_point(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    #[cfg(test)]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// At least one point, all points finite and a positive width.
    /// Strokes read from disk that fail this are skipped.
    pub fn is_well_formed(&self) -> bool {
        !self.points.is_empty()
            && self.points.iter().all(|p| p.is_finite())
            && self.width.is_finite()
            && self.width > 0.0
    }

    /// Axis-aligned bounds of the inked area (points padded by half the width)
    pub fn bounds(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));

        let padding = Vec2::splat(self.width / 2.0);
        Some(Rect::from_corners(min - padding, max + padding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen_stroke(point: Vec2) -> Stroke {
        Stroke::begin(DrawingTool::Pen, Rgb::BLACK, 2.0, point).unwrap()
    }

    #[test]
    fn test_well_formed() {
        assert!(pen_stroke(Vec2::ZERO).is_well_formed());

        let json = r#"{"tool":"pen","color":{"r":0,"g":0,"b":0},"width":2.0,"points":[]}"#;
        let stroke: Stroke = serde_json::from_str(json).unwrap();
        assert!(!stroke.is_well_formed());

        let json = r#"{"tool":"pen","color":{"r":0,"g":0,"b":0},"width":-1.0,"points":[[1.0,2.0]]}"#;
        let stroke: Stroke = serde_json::from_str(json).unwrap();
        assert!(!stroke.is_well_formed());
    }

    #[test]
    fn test_begin_anchors_first_point() {
        let stroke = pen_stroke(Vec2::new(3.0, 4.0));
        assert_eq!(stroke.points(), &[Vec2::new(3.0, 4.0)]);
        assert!(!stroke.is_finalized());
    }

    #[test]
    fn test_begin_rejects_non_finite_point() {
        let result = Stroke::begin(DrawingTool::Pen, Rgb::BLACK, 2.0, Vec2::new(f32::NAN, 0.0));
        assert!(matches!(result, Err(StrokeError::NonFinitePoint(_, _))));
    }

    #[test]
    fn test_begin_rejects_non_positive_width() {
        let result = Stroke::begin(DrawingTool::Pen, Rgb::BLACK, 0.0, Vec2::ZERO);
        assert_eq!(result, Err(StrokeError::InvalidWidth(0.0)));
    }

    #[test]
    fn test_extend_is_noop_after_finalize() {
        let mut stroke = pen_stroke(Vec2::ZERO);
        stroke.extend(Vec2::new(1.0, 1.0));
        stroke.finalize();
        stroke.extend(Vec2::new(2.0, 2.0));
        assert_eq!(stroke.points().len(), 2);
    }

    #[test]
    fn test_extend_skips_non_finite_points() {
        let mut stroke = pen_stroke(Vec2::ZERO);
        stroke.extend(Vec2::new(f32::INFINITY, 1.0));
        assert_eq!(stroke.points().len(), 1);
    }

    #[test]
    fn test_single_point_stroke_is_valid_after_finalize() {
        let mut stroke = pen_stroke(Vec2::new(5.0, 5.0));
        stroke.finalize();
        assert!(stroke.is_finalized());
        assert_eq!(stroke.points().len(), 1);
    }

    #[test]
    fn test_bounds_are_padded_by_half_width() {
        let mut stroke = Stroke::begin(DrawingTool::Pen, Rgb::BLACK, 4.0, Vec2::new(10.0, 10.0)).unwrap();
        stroke.extend(Vec2::new(20.0, 30.0));
        let bounds = stroke.bounds().unwrap();
        assert_eq!(bounds.min, Vec2::new(8.0, 8.0));
        assert_eq!(bounds.max, Vec2::new(22.0, 32.0));
    }

    #[test]
    fn test_deserialized_stroke_is_finalized() {
        let mut stroke = pen_stroke(Vec2::ZERO);
        stroke.extend(Vec2::ONE);
        let json = serde_json::to_string(&stroke).unwrap();
        let parsed: Stroke = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_finalized());
        assert_eq!(parsed.points(), stroke.points());
        assert_eq!(parsed.tool(), DrawingTool::Pen);
    }
}
