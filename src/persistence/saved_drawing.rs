//! On-disk drawing format.

use serde::{Deserialize, Serialize};

use crate::canvas::Stroke;

pub const SAVED_DRAWING_VERSION: u32 = 1;

/// Committed strokes plus the context they were drawn in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDrawing {
    pub version: u32,
    /// Canvas size at save time. Strokes are not rescaled on load.
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl SavedDrawing {
    pub fn new(strokes: Vec<Stroke>, width: u32, height: u32, question_id: Option<String>) -> Self {
        Self {
            version: SAVED_DRAWING_VERSION,
            width,
            height,
            question_id,
            strokes,
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize drawing: {}", e))
    }

    /// Parse a drawing file. Files from a newer version are rejected.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let drawing: SavedDrawing =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse drawing file: {}", e))?;
        if drawing.version > SAVED_DRAWING_VERSION {
            return Err(format!(
                "Drawing file version {} is newer than supported version {}",
                drawing.version, SAVED_DRAWING_VERSION
            ));
        }
        Ok(drawing)
    }

    /// Strokes safe to replay; malformed ones are dropped
    pub fn into_valid_strokes(self) -> (Vec<Stroke>, usize) {
        let total = self.strokes.len();
        let valid: Vec<Stroke> = self.strokes.into_iter().filter(Stroke::is_well_formed).collect();
        let skipped = total - valid.len();
        (valid, skipped)
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::*;
    use crate::canvas::{DrawingTool, Rgb};

    fn stroke(tool: DrawingTool, points: &[(f32, f32)]) -> Stroke {
        let mut stroke = Stroke::begin(tool, Rgb::new(255, 0, 0), 3.0, Vec2::new(points[0].0, points[0].1)).unwrap();
        for &(x, y) in &points[1..] {
            stroke.extend(Vec2::new(x, y));
        }
        stroke.finalize();
        stroke
    }

    #[test]
    fn test_save_and_load_preserve_strokes_and_order() {
        let drawing = SavedDrawing::new(
            vec![
                stroke(DrawingTool::Pen, &[(1.0, 2.0), (3.0, 4.0)]),
                stroke(DrawingTool::Eraser, &[(2.0, 2.0)]),
                stroke(DrawingTool::Highlighter, &[(0.0, 0.0), (10.0, 0.0)]),
            ],
            640,
            480,
            Some("q1".to_string()),
        );
        let json = drawing.to_json().unwrap();
        let loaded = SavedDrawing::from_json(&json).unwrap();
        assert_eq!(loaded, drawing);
        assert!(loaded.strokes.iter().all(|s| s.is_finalized()));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let loaded = SavedDrawing::from_json(r#"{"version":1,"width":10,"height":20}"#).unwrap();
        assert!(loaded.strokes.is_empty());
        assert!(loaded.question_id.is_none());
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = SavedDrawing::from_json(r#"{"version":99,"width":10,"height":20}"#);
        assert!(result.unwrap_err().contains("newer"));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(SavedDrawing::from_json("not json").is_err());
    }

    #[test]
    fn test_malformed_strokes_are_skipped() {
        let json = r#"{
            "version": 1,
            "width": 100,
            "height": 100,
            "strokes": [
                {"tool":"pen","color":{"r":0,"g":0,"b":0},"width":2.0,"points":[[1.0,1.0],[5.0,5.0]]},
                {"tool":"pen","color":{"r":0,"g":0,"b":0},"width":2.0,"points":[]},
                {"tool":"marker","color":{"r":0,"g":0,"b":0},"width":0.0,"points":[[1.0,1.0]]}
            ]
        }"#;
        let (strokes, skipped) = SavedDrawing::from_json(json).unwrap().into_valid_strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(skipped, 2);
    }
}
