//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels (also the initial canvas width)
pub const DEFAULT_WINDOW_WIDTH: f32 = 1280.0;

/// Default window height in pixels (also the initial canvas height)
pub const DEFAULT_WINDOW_HEIGHT: f32 = 800.0;

/// Vertical distance between ruled background lines, in canvas pixels.
/// Also the band height used by the placeholder recognizer.
pub const RULED_LINE_SPACING: u32 = 30;

/// Opacity applied to highlighter strokes
pub const HIGHLIGHTER_OPACITY: f32 = 0.3;

/// Default stroke width for new strokes
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;

/// Stroke width presets offered in the toolbar
pub const STROKE_WIDTH_PRESETS: [f32; 5] = [1.0, 2.0, 4.0, 6.0, 8.0];

/// Minimum seconds between two implicit checks of the same question
pub const DEFAULT_CHECK_INTERVAL_SECS: f32 = 10.0;

/// Idle seconds before an expanded hint collapses itself
pub const DEFAULT_HINT_COLLAPSE_SECS: f32 = 10.0;

/// Horizontal gap between a region's right edge and its marker
pub const MARKER_OFFSET_X: f32 = 10.0;

/// Marker diameter in canvas pixels
pub const MARKER_SIZE: f32 = 24.0;

/// Vertical gap kept between stacked markers
pub const MARKER_STACK_GAP: f32 = 4.0;

/// Offset from the marker's top edge to its message panel
pub const MARKER_MESSAGE_OFFSET_Y: f32 = 30.0;

/// Width of an expanded marker message panel
pub const MARKER_MESSAGE_WIDTH: f32 = 280.0;

/// Default number of questions requested from the question source
pub const DEFAULT_QUESTION_COUNT: usize = 5;
