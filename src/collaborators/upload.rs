//! Turning scanned or pasted question text into a `Question`.

use std::hash::{DefaultHasher, Hash, Hasher};

use super::question::{Difficulty, Question, QuestionOption};
use super::CollaboratorError;

/// What the scanner produces for the bundled sample sheet
pub const SAMPLE_SCAN_TEXT: &str = "What is the value of x in the equation 2x + 5 = 15?
A) x = 5
B) x = 10
C) x = -5
D) x = 6";

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// `A) text` .. `D) text`, returning the label and the trimmed text
fn parse_option_line(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let label = chars.next()?.to_ascii_uppercase();
    if !OPTION_LABELS.contains(&label) || chars.next()? != ')' {
        return None;
    }
    Some((label, chars.as_str().trim()))
}

/// Parse free text into a question.
///
/// The first non-blank line that is not an option is the prompt. Option lines
/// become the answer choices and the first one is taken as correct, since
/// scanned sheets carry no answer key.
pub fn parse_question_text(text: &str) -> Result<Question, CollaboratorError> {
    let mut prompt: Option<&str> = None;
    let mut options = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((label, option_text)) = parse_option_line(line) {
            options.push(QuestionOption {
                id: label.to_string(),
                text: option_text.to_string(),
                is_correct: options.is_empty(),
            });
        } else if prompt.is_none() {
            prompt = Some(line);
        }
    }

    let Some(prompt) = prompt else {
        return Err(CollaboratorError::Malformed(
            "no question text found".to_string(),
        ));
    };

    let mut hasher = DefaultHasher::new();
    text.trim().hash(&mut hasher);

    Ok(Question {
        id: format!("uploaded-{:016x}", hasher.finish()),
        text: prompt.to_string(),
        options,
        difficulty: Difficulty::Medium,
        subject: "Unknown".to_string(),
        chapter: "Unknown".to_string(),
        solution: None,
    })
}
