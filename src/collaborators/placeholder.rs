//! Deterministic stand-ins for the recognition, checking, hint and voice backends.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bevy::prelude::*;

use super::question::Question;
use super::{Checker, CollaboratorError, HintGenerator, Recognizer, StepCheck, VoiceListener};
use crate::canvas::{BoundingBox, DrawingSnapshot, RecognizedRegion, Stroke};
use crate::constants::RULED_LINE_SPACING;

/// Groups ink by ruled-line band: every band with ink is one step
pub struct PlaceholderRecognizer;

impl Recognizer for PlaceholderRecognizer {
    fn recognize(&self, strokes: &[Stroke]) -> Result<Vec<RecognizedRegion>, CollaboratorError> {
        let band_height = RULED_LINE_SPACING as f32;
        // BTreeMap keeps bands ordered top to bottom
        let mut bands: BTreeMap<i64, (Rect, usize)> = BTreeMap::new();

        for stroke in strokes.iter().filter(|s| !s.tool().is_eraser()) {
            let Some(bounds) = stroke.bounds() else {
                continue;
            };
            let band = (bounds.center().y / band_height).floor() as i64;
            bands
                .entry(band)
                .and_modify(|(rect, count)| {
                    *rect = rect.union(bounds);
                    *count += 1;
                })
                .or_insert((bounds, 1));
        }

        Ok(bands
            .into_iter()
            .map(|(band, (rect, count))| RecognizedRegion {
                id: format!("step-{}", band),
                content: format!("{} stroke(s)", count),
                bounding_box: Some(BoundingBox::from_rect(rect)),
            })
            .collect())
    }
}

const ERROR_MESSAGES: [&str; 5] = [
    "There's an error in your differentiation. Remember that the derivative of x^n is n*x^(n-1).",
    "Check your arithmetic in this step. There seems to be a calculation error.",
    "You've applied the wrong rule here. For polynomial terms, use the power rule: d/dx(x^n) = n*x^(n-1).",
    "There's a sign error in this step. Double-check your work.",
    "Make sure you're differentiating every term correctly.",
];

/// Accepts as many steps as the reference solution has; anything past that is wrong
pub struct PlaceholderChecker;

impl Checker for PlaceholderChecker {
    fn check(&self, snapshot: &DrawingSnapshot, question: &Question) -> Result<Vec<StepCheck>, CollaboratorError> {
        let accepted = match &question.solution {
            Some(solution) => solution.steps.len(),
            None => 1,
        };

        Ok(snapshot
            .regions
            .iter()
            .enumerate()
            .map(|(i, region)| {
                if i < accepted {
                    StepCheck::correct(region.id.clone())
                } else {
                    StepCheck::incorrect(region.id.clone(), ERROR_MESSAGES[i % ERROR_MESSAGES.len()])
                }
            })
            .collect())
    }
}

/// Picks a hint from how many steps have been written so far
#[derive(Default)]
pub struct PlaceholderHintGenerator {
    /// Simulated thinking time, applied by the caller as a response delay
    pub latency: Duration,
}

impl HintGenerator for PlaceholderHintGenerator {
    fn generate_hint(&self, snapshot: &DrawingSnapshot, question: &Question) -> Result<String, CollaboratorError> {
        let derivative = question.text.to_lowercase().contains("derivative");
        let hint = match (snapshot.regions.len(), derivative) {
            (0, true) => {
                "Start by identifying the function you need to differentiate. Apply the power rule to each term."
            }
            (0, false) => "Begin by writing down the given information and identifying what you need to solve.",
            (1, true) => {
                "For the power rule, remember that the derivative of x^n is n*x^(n-1). Apply this to each term."
            }
            (1, false) => "Now try to apply the appropriate formula or method to solve this problem.",
            (2, _) => "Now combine like terms and simplify your expression.",
            _ => {
                "You're on the right track! Double-check your calculations and make sure you've addressed all parts of the question."
            }
        };
        Ok(hint.to_string())
    }

    fn response_delay(&self) -> Duration {
        self.latency
    }
}

const TRANSCRIPTS: [&str; 5] = [
    "Can you check my work please?",
    "Give me a hint on what to do next",
    "I need help with this problem",
    "Check if my solution is correct",
    "Show me the next step",
];

/// Cycles through canned transcripts
#[derive(Default)]
pub struct PlaceholderListener {
    /// Simulated recording time, applied by the caller as a response delay
    pub latency: Duration,
    next: AtomicUsize,
}

impl PlaceholderListener {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            next: AtomicUsize::new(0),
        }
    }
}

impl VoiceListener for PlaceholderListener {
    fn listen(&self) -> Result<String, CollaboratorError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % TRANSCRIPTS.len();
        Ok(TRANSCRIPTS[index].to_string())
    }

    fn response_delay(&self) -> Duration {
        self.latency
    }
}
