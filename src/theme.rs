//! Centralized color theme for the application.
//!
//! This module provides all colors used by the canvas raster, the overlay
//! markers and the egui panels. Modify values here to change the color scheme.

use bevy::prelude::Color;
use bevy_egui::egui;

use crate::canvas::Rgb;

// ============================================================================
// Canvas Colors
// ============================================================================

/// Window clear color behind the (transparent) canvas raster
pub const CANVAS_BACKGROUND: Color = Color::WHITE;

/// Ruled background lines
pub const RULED_LINE: Rgb = Rgb::new(0xe6, 0xe6, 0xe6);

/// Default ink color for new strokes
pub const DEFAULT_INK: Rgb = Rgb::BLACK;

/// Ink palette offered in the toolbar
pub fn ink_palette() -> [(Rgb, &'static str); 8] {
    [
        (Rgb::BLACK, "Black"),
        (Rgb::new(0xff, 0x00, 0x00), "Red"),
        (Rgb::new(0x00, 0x00, 0xff), "Blue"),
        (Rgb::new(0x00, 0x80, 0x00), "Green"),
        (Rgb::new(0xff, 0xa5, 0x00), "Orange"),
        (Rgb::new(0x80, 0x00, 0x80), "Purple"),
        (Rgb::new(0xff, 0xc0, 0xcb), "Pink"),
        (Rgb::new(0xff, 0xff, 0x00), "Yellow"),
    ]
}

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background (tool settings bar)
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// White for selected swatch borders
    pub const SELECTED_BORDER: egui::Color32 = egui::Color32::WHITE;

    /// Dark grey for unselected swatch borders
    pub const UNSELECTED_BORDER: egui::Color32 = egui::Color32::DARK_GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::RED;

    /// Light blue background of the hint card body
    pub const HINT_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(235, 245, 255);

    /// Dark blue hint text
    pub const HINT_BODY_TEXT: egui::Color32 = egui::Color32::from_rgb(30, 64, 175);

    /// Yellow-brown text for dependent-error notes
    pub const WARNING_TEXT: egui::Color32 = egui::Color32::from_rgb(161, 98, 7);

    /// Marker colors
    pub mod marker {
        use bevy_egui::egui;

        pub const CORRECT: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
        pub const ERROR: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
        pub const WARNING: egui::Color32 = egui::Color32::from_rgb(234, 179, 8);

        pub const CORRECT_TEXT: egui::Color32 = egui::Color32::from_rgb(21, 128, 61);
        pub const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(185, 28, 28);
        pub const WARNING_TEXT: egui::Color32 = egui::Color32::from_rgb(161, 98, 7);
    }
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// Convert an ink color to egui Color32 (fully opaque)
pub fn rgb_to_egui(color: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_starts_with_default_ink() {
        assert_eq!(ink_palette()[0].0, DEFAULT_INK);
    }

    #[test]
    fn test_palette_colors_are_unique() {
        let palette = ink_palette();
        for (i, (a, _)) in palette.iter().enumerate() {
            for (b, _) in palette.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_rgb_to_egui() {
        let c = rgb_to_egui(Rgb::new(10, 20, 30));
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (10, 20, 30, 255));
    }
}
