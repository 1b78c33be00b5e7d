//! External capabilities the session relies on.
//!
//! Each collaborator is a plain synchronous trait object. The session runs
//! the calls on Bevy's task pools and correlates the results itself, so an
//! implementation is free to block (network, model inference, microphone).
//! The placeholders in this module stand in until real backends exist.

mod placeholder;
mod question;
mod question_bank;
mod upload;

pub use placeholder::{
    PlaceholderChecker, PlaceholderHintGenerator, PlaceholderListener, PlaceholderRecognizer,
};
pub use question::{course_catalog, Difficulty, Question, SelectionCriteria};
pub use question_bank::{reference_solution, QuestionBank};
pub use upload::{parse_question_text, SAMPLE_SCAN_TEXT};

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use thiserror::Error;

use crate::canvas::{DrawingSnapshot, RecognizedRegion, Stroke};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollaboratorError {
    #[error("service unavailable")]
    Unavailable,
    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Verdict for one recognized region
#[derive(Debug, Clone, PartialEq)]
pub struct StepCheck {
    pub region_id: String,
    pub is_correct: bool,
    /// Present iff the step is incorrect
    pub error_message: Option<String>,
    /// Set for correct steps that follow an incorrect one
    pub warning_message: Option<String>,
}

impl StepCheck {
    pub fn correct(region_id: impl Into<String>) -> Self {
        Self {
            region_id: region_id.into(),
            is_correct: true,
            error_message: None,
            warning_message: None,
        }
    }

    pub fn incorrect(region_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            region_id: region_id.into(),
            is_correct: false,
            error_message: Some(message.into()),
            warning_message: None,
        }
    }
}

pub trait QuestionSource: Send + Sync {
    fn fetch(&self, criteria: &SelectionCriteria) -> Result<Vec<Question>, CollaboratorError>;
    fn fetch_by_id(&self, id: &str) -> Result<Option<Question>, CollaboratorError>;
}

/// Turns committed strokes into step regions
pub trait Recognizer: Send + Sync {
    fn recognize(&self, strokes: &[Stroke]) -> Result<Vec<RecognizedRegion>, CollaboratorError>;
}

/// Judges each recognized region of a snapshot, in region order
pub trait Checker: Send + Sync {
    fn check(&self, snapshot: &DrawingSnapshot, question: &Question) -> Result<Vec<StepCheck>, CollaboratorError>;
}

pub trait HintGenerator: Send + Sync {
    fn generate_hint(&self, snapshot: &DrawingSnapshot, question: &Question) -> Result<String, CollaboratorError>;

    /// How long after the request the hint should be shown at the earliest
    fn response_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Records one utterance and returns its transcript
pub trait VoiceListener: Send + Sync {
    fn listen(&self) -> Result<String, CollaboratorError>;

    /// Minimum time the listening indicator stays up
    fn response_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// The collaborators in use. Swap any field to plug in a real backend.
#[derive(Resource, Clone)]
pub struct Collaborators {
    pub questions: Arc<dyn QuestionSource>,
    pub recognizer: Arc<dyn Recognizer>,
    pub checker: Arc<dyn Checker>,
    pub hints: Arc<dyn HintGenerator>,
    pub voice: Arc<dyn VoiceListener>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            questions: Arc::new(QuestionBank::default()),
            recognizer: Arc::new(PlaceholderRecognizer),
            checker: Arc::new(PlaceholderChecker),
            hints: Arc::new(PlaceholderHintGenerator {
                latency: Duration::from_millis(1500),
            }),
            voice: Arc::new(PlaceholderListener::with_latency(Duration::from_secs(3))),
        }
    }
}
