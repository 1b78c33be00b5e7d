//! Drawing tools and their keyboard shortcuts.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::HIGHLIGHTER_OPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingTool {
    #[default]
    Pen,
    Marker,
    Highlighter,
    Eraser,
}

impl DrawingTool {
    pub fn display_name(&self) -> &'static str {
        match self {
            DrawingTool::Pen => "Pen (P)",
            DrawingTool::Marker => "Marker (M)",
            DrawingTool::Highlighter => "Highlighter (H)",
            DrawingTool::Eraser => "Eraser (E)",
        }
    }

    pub fn all() -> &'static [DrawingTool] {
        &[
            DrawingTool::Pen,
            DrawingTool::Marker,
            DrawingTool::Highlighter,
            DrawingTool::Eraser,
        ]
    }

    /// Keyboard shortcut that selects this tool
    pub fn shortcut(&self) -> KeyCode {
        match self {
            DrawingTool::Pen => KeyCode::KeyP,
            DrawingTool::Marker => KeyCode::KeyM,
            DrawingTool::Highlighter => KeyCode::KeyH,
            DrawingTool::Eraser => KeyCode::KeyE,
        }
    }

    /// Opacity the tool's strokes are composited with
    pub fn opacity(&self) -> f32 {
        match self {
            DrawingTool::Highlighter => HIGHLIGHTER_OPACITY,
            _ => 1.0,
        }
    }

    /// Eraser strokes remove coverage instead of adding ink, so their color is meaningless
    pub fn is_eraser(&self) -> bool {
        matches!(self, DrawingTool::Eraser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_contain_shortcuts() {
        for tool in DrawingTool::all() {
            let name = tool.display_name();
            assert!(name.contains('('), "Display name should contain shortcut: {}", name);
            assert!(name.contains(')'), "Display name should contain shortcut: {}", name);
        }
    }

    #[test]
    fn test_shortcuts_are_unique() {
        let all = DrawingTool::all();
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a.shortcut(), b.shortcut());
            }
        }
    }

    #[test]
    fn test_default_tool_is_pen() {
        assert_eq!(DrawingTool::default(), DrawingTool::Pen);
    }

    #[test]
    fn test_only_highlighter_is_translucent() {
        assert_eq!(DrawingTool::Pen.opacity(), 1.0);
        assert_eq!(DrawingTool::Marker.opacity(), 1.0);
        assert_eq!(DrawingTool::Eraser.opacity(), 1.0);
        assert!(DrawingTool::Highlighter.opacity() < 1.0);
    }

    #[test]
    fn test_tool_serializes_lowercase() {
        let json = serde_json::to_string(&DrawingTool::Highlighter).unwrap();
        assert_eq!(json, "\"highlighter\"");
    }
}
