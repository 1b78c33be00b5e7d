//! Marker placement for step verdicts.

use bevy::prelude::*;

use crate::canvas::RecognizedRegion;
use crate::collaborators::StepCheck;
use crate::constants::{MARKER_OFFSET_X, MARKER_SIZE, MARKER_STACK_GAP};
use crate::session::{DEFAULT_ERROR_MESSAGE, DEPENDENT_WARNING};

pub const CORRECT_MESSAGE: &str = "This step looks correct!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Correct,
    Error,
    Warning,
}

impl MarkerKind {
    pub fn for_step(is_correct: bool, has_warning: bool) -> Self {
        match (is_correct, has_warning) {
            (false, _) => MarkerKind::Error,
            (true, true) => MarkerKind::Warning,
            (true, false) => MarkerKind::Correct,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            MarkerKind::Correct => "✓",
            MarkerKind::Error => "✗",
            MarkerKind::Warning => "!",
        }
    }
}

/// A marker ready to draw, in canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub region_id: String,
    pub kind: MarkerKind,
    /// Top-left corner of the marker
    pub position: Vec2,
    pub message: String,
}

fn message_for(step: &StepCheck, kind: MarkerKind) -> String {
    match kind {
        MarkerKind::Correct => CORRECT_MESSAGE.to_string(),
        MarkerKind::Error => step
            .error_message
            .clone()
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        MarkerKind::Warning => step
            .warning_message
            .clone()
            .unwrap_or_else(|| DEPENDENT_WARNING.to_string()),
    }
}

/// Place one marker per verdict whose region has a bounding box.
///
/// Markers sit right of the region, vertically centred on it. A marker that
/// would overlap the one above it (in region order) is pushed down below it.
/// Identical input always yields identical positions.
pub fn layout_markers(steps: &[StepCheck], regions: &[RecognizedRegion]) -> Vec<PlacedMarker> {
    let mut placed: Vec<(usize, PlacedMarker)> = Vec::with_capacity(steps.len());

    for step in steps {
        let Some((index, region)) = regions
            .iter()
            .enumerate()
            .find(|(_, r)| r.id == step.region_id)
        else {
            warn!("No region {} for verdict, omitting marker", step.region_id);
            continue;
        };
        let Some(bounds) = region.bounding_box else {
            warn!("Region {} has no bounding box, omitting marker", region.id);
            continue;
        };

        let kind = MarkerKind::for_step(step.is_correct, step.warning_message.is_some());
        let position = Vec2::new(
            bounds.right() + MARKER_OFFSET_X,
            bounds.center_y() - MARKER_SIZE / 2.0,
        );
        placed.push((
            index,
            PlacedMarker {
                region_id: region.id.clone(),
                kind,
                position,
                message: message_for(step, kind),
            },
        ));
    }

    placed.sort_by_key(|(index, _)| *index);
    let mut markers: Vec<PlacedMarker> = placed.into_iter().map(|(_, m)| m).collect();
    stack_overlapping(&mut markers);
    markers
}

fn overlaps(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < MARKER_SIZE && (a.y - b.y).abs() < MARKER_SIZE
}

fn stack_overlapping(markers: &mut [PlacedMarker]) {
    for i in 1..markers.len() {
        // Re-scan after each push since moving down can hit another earlier marker
        loop {
            let position = markers[i].position;
            let blocker = markers[..i]
                .iter()
                .filter(|m| overlaps(m.position, position))
                .map(|m| m.position.y)
                .fold(None, |acc: Option<f32>, y| Some(acc.map_or(y, |a| a.max(y))));
            match blocker {
                Some(y) => markers[i].position.y = y + MARKER_SIZE + MARKER_STACK_GAP,
                None => break,
            }
        }
    }
}
