//! Drawing history for undo/redo.
//!
//! Two ordered stacks of finalized strokes: `committed` is what the canvas
//! renders, `redoable` holds strokes removed by undo. A stroke is never in both.
//! The only mutators are commit, undo, redo, clear and restore, so the
//! append-and-truncate discipline cannot be bypassed.
//!
//! Every mutation of `committed` bumps `revision`, which snapshots use as the
//! identity of the stroke sequence.

use std::sync::Arc;

use super::stroke::Stroke;

#[derive(Debug, Default)]
pub struct DrawingHistory {
    /// Strokes currently rendered (oldest first)
    committed: Vec<Stroke>,
    /// Strokes that can be redone (most recently undone last)
    redoable: Vec<Stroke>,
    revision: u64,
}

impl DrawingHistory {
    /// Append a finished stroke. Strokes that were not finalized are finalized here.
    pub fn commit(&mut self, mut stroke: Stroke) {
        stroke.finalize();
        self.committed.push(stroke);
        self.redoable.clear();
        self.revision += 1;
    }

    /// Drop redo history; called when a new gesture starts
    pub fn clear_redo(&mut self) {
        self.redoable.clear();
    }

    /// Move the newest committed stroke to the redo stack
    pub fn undo(&mut self) -> bool {
        let Some(stroke) = self.committed.pop() else {
            return false;
        };
        self.redoable.push(stroke);
        self.revision += 1;
        true
    }

    /// Move the most recently undone stroke back onto the canvas
    pub fn redo(&mut self) -> bool {
        let Some(stroke) = self.redoable.pop() else {
            return false;
        };
        self.committed.push(stroke);
        self.revision += 1;
        true
    }

    /// Empty both stacks. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        if self.committed.is_empty() && self.redoable.is_empty() {
            return false;
        }
        let had_committed = !self.committed.is_empty();
        self.committed.clear();
        self.redoable.clear();
        if had_committed {
            self.revision += 1;
        }
        true
    }

    /// Replace the committed strokes wholesale (loading a saved drawing)
    pub fn restore(&mut self, strokes: Vec<Stroke>) {
        self.committed = strokes
            .into_iter()
            .map(|mut stroke| {
                stroke.finalize();
                stroke
            })
            .collect();
        self.redoable.clear();
        self.revision += 1;
    }

    pub fn committed(&self) -> &[Stroke] {
        &self.committed
    }

    /// Shared copy of the committed strokes for snapshots
    pub fn committed_shared(&self) -> Arc<Vec<Stroke>> {
        Arc::new(self.committed.clone())
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redoable.is_empty()
    }

    #[cfg(test)]
    pub fn committed_count(&self) -> usize {
        self.committed.len()
    }

    #[cfg(test)]
    pub fn redo_count(&self) -> usize {
        self.redoable.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::*;
    use crate::canvas::{DrawingTool, Rgb};

    fn stroke_at(x: f32) -> Stroke {
        let mut stroke = Stroke::begin(DrawingTool::Pen, Rgb::BLACK, 2.0, Vec2::new(x, 0.0)).unwrap();
        stroke.extend(Vec2::new(x, 10.0));
        stroke
    }

    #[test]
    fn test_commit_finalizes_and_appends() {
        let mut history = DrawingHistory::default();
        assert!(!history.can_undo());

        history.commit(stroke_at(1.0));
        assert!(history.can_undo());
        assert_eq!(history.committed_count(), 1);
        assert!(history.committed()[0].is_finalized());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut history = DrawingHistory::default();
        let revision = history.revision();
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(history.revision(), revision);
    }

    #[test]
    fn test_undo_then_redo_restores_committed() {
        let mut history = DrawingHistory::default();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        let before = history.committed().to_vec();

        assert!(history.undo());
        assert_eq!(history.committed_count(), 1);
        assert_eq!(history.redo_count(), 1);

        assert!(history.redo());
        assert_eq!(history.committed(), before.as_slice());
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn test_clear_redo_invalidates_redo() {
        let mut history = DrawingHistory::default();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        history.undo();
        assert!(history.can_redo());

        history.clear_redo();
        assert!(!history.can_redo());
        assert_eq!(history.committed_count(), 1);
    }

    #[test]
    fn test_commit_after_undo_clears_redo() {
        let mut history = DrawingHistory::default();
        history.commit(stroke_at(1.0));
        history.undo();
        history.commit(stroke_at(2.0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_clear_empties_both_stacks() {
        let mut history = DrawingHistory::default();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        history.undo();

        assert!(history.clear());
        assert_eq!(history.committed_count(), 0);
        assert_eq!(history.redo_count(), 0);
        assert!(!history.clear());
    }

    #[test]
    fn test_revision_tracks_committed_changes() {
        let mut history = DrawingHistory::default();
        let r0 = history.revision();
        history.commit(stroke_at(1.0));
        let r1 = history.revision();
        assert!(r1 > r0);

        history.clear_redo();
        assert_eq!(history.revision(), r1);

        history.undo();
        assert!(history.revision() > r1);
    }

    #[test]
    fn test_restore_replaces_strokes_and_drops_redo() {
        let mut history = DrawingHistory::default();
        history.commit(stroke_at(1.0));
        history.commit(stroke_at(2.0));
        history.undo();

        history.restore(vec![stroke_at(5.0), stroke_at(6.0), stroke_at(7.0)]);
        assert_eq!(history.committed_count(), 3);
        assert!(!history.can_redo());
        assert!(history.committed().iter().all(|s| s.is_finalized()));
    }
}
