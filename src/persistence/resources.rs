//! Resource and task types for drawing file I/O.

use bevy::prelude::*;
use bevy::tasks::Task;
use std::path::PathBuf;

use super::saved_drawing::SavedDrawing;

/// Result of a save or export
pub struct WriteResult {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

pub struct LoadResult {
    pub path: PathBuf,
    pub drawing: Option<SavedDrawing>,
    pub error: Option<String>,
}

/// Tracks the drawing file operation in progress
#[derive(Resource, Default)]
pub struct AsyncDrawingOperation {
    pub is_saving: bool,
    pub is_loading: bool,
    pub is_exporting: bool,
    pub operation_description: Option<String>,
}

impl AsyncDrawingOperation {
    pub fn is_busy(&self) -> bool {
        self.is_saving || self.is_loading || self.is_exporting
    }

    pub fn finish(&mut self) {
        *self = Self::default();
    }
}

/// Last save, load or export failure, shown until dismissed
#[derive(Resource, Default)]
pub struct DrawingIoError {
    pub message: Option<String>,
}

/// The file the current drawing was last saved to or loaded from
#[derive(Resource, Default)]
pub struct CurrentDrawingFile {
    pub path: Option<PathBuf>,
}

#[derive(Component)]
pub struct SaveDrawingTask(pub Task<WriteResult>);

#[derive(Component)]
pub struct LoadDrawingTask(pub Task<LoadResult>);

#[derive(Component)]
pub struct ExportPngTask(pub Task<WriteResult>);

pub(super) fn file_label(path: &std::path::Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_while_any_operation_runs() {
        let mut op = AsyncDrawingOperation::default();
        assert!(!op.is_busy());
        op.is_exporting = true;
        assert!(op.is_busy());
        op.finish();
        assert!(!op.is_busy());
        assert!(op.operation_description.is_none());
    }

    #[test]
    fn test_file_label() {
        assert_eq!(file_label(std::path::Path::new("drawings/work.json"), "drawing"), "work.json");
        assert_eq!(file_label(std::path::Path::new("/"), "drawing"), "drawing");
    }
}
