//! Messages exchanged between the session and the UI.

use bevy::prelude::*;

use super::coordinator::CheckOutcome;
use crate::collaborators::{Question, SelectionCriteria};

/// Make `question` the active question (`None` deselects)
#[derive(Message, Clone)]
pub struct SelectQuestionRequest {
    pub question: Option<Question>,
}

/// Look a question up by id and select it if it still exists
#[derive(Message, Clone)]
pub struct LoadQuestionRequest {
    pub id: String,
}

#[derive(Message, Clone)]
pub struct FetchQuestionsRequest {
    pub criteria: SelectionCriteria,
}

/// Parse scanned or pasted question text and select the result
#[derive(Message, Clone)]
pub struct UploadQuestionRequest {
    pub text: String,
}

/// Explicit check from the toolbar or a voice command
#[derive(Message, Clone, Copy, Default)]
pub struct CheckRequested;

#[derive(Message, Clone, Copy, Default)]
pub struct HintRequested;

#[derive(Message, Clone, Copy, Default)]
pub struct ListenRequested;

/// The active question changed
#[derive(Message, Clone)]
pub struct QuestionChanged {
    pub question_id: Option<String>,
}

/// A check outcome was applied
#[derive(Message, Clone)]
pub struct CheckResolved {
    pub outcome: CheckOutcome,
}
