//! Immutable drawing snapshots handed to collaborators and persistence.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::stroke::Stroke;

/// Region bounds in canvas coordinates (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.min.x,
            y: rect.min.y,
            width: rect.width(),
            height: rect.height(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// One recognized step of the user's working
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedRegion {
    pub id: String,
    /// Best-effort transcription, opaque to the canvas
    pub content: String,
    /// Missing when the recognizer could not locate the step
    pub bounding_box: Option<BoundingBox>,
}

/// Identity used to decide whether a snapshot is worth re-checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub revision: u64,
    pub region_count: usize,
}

/// Committed strokes plus the last recognized regions at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSnapshot {
    /// History revision the strokes were taken from
    pub revision: u64,
    pub strokes: Arc<Vec<Stroke>>,
    pub regions: Arc<Vec<RecognizedRegion>>,
    pub width: u32,
    pub height: u32,
}

impl DrawingSnapshot {
    pub fn key(&self) -> SnapshotKey {
        SnapshotKey {
            revision: self.revision,
            region_count: self.regions.len(),
        }
    }
}
