//! Session state shown by the UI.

use bevy::prelude::*;

use super::voice::VoiceIntent;
use crate::collaborators::{Question, SelectionCriteria};

/// Questions offered in the question panel
#[derive(Resource, Default)]
pub struct QuestionList {
    pub criteria: SelectionCriteria,
    pub questions: Vec<Question>,
    pub is_fetching: bool,
    /// Last fetch or upload failure, shown under the list
    pub error: Option<String>,
}

impl QuestionList {
    /// Put an uploaded question at the top, replacing an earlier copy
    pub fn insert_uploaded(&mut self, question: Question) {
        self.questions.retain(|q| q.id != question.id);
        self.questions.insert(0, question);
    }
}

#[derive(Resource, Default)]
pub struct VoiceStatus {
    pub is_listening: bool,
    pub last_transcript: Option<String>,
    pub last_intent: Option<VoiceIntent>,
}
