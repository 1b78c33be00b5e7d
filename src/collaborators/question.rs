//! Question data exchanged with the question source.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub id: u32,
    pub content: String,
    /// TeX source of the step's working
    pub latex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub steps: Vec<SolutionStep>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub difficulty: Difficulty,
    pub subject: String,
    pub chapter: String,
    #[serde(default)]
    pub solution: Option<Solution>,
}

impl Question {
    #[cfg(test)]
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

/// Filters for `QuestionSource::fetch`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCriteria {
    pub subject: Option<String>,
    /// Matched as a case-insensitive substring of the question's chapter
    pub chapter: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Matched as a case-insensitive substring of text, subject or chapter
    pub concept: Option<String>,
    pub count: usize,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            subject: None,
            chapter: None,
            difficulty: None,
            concept: None,
            count: crate::constants::DEFAULT_QUESTION_COUNT,
        }
    }
}

impl SelectionCriteria {
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(subject) = &self.subject
            && !question.subject.eq_ignore_ascii_case(subject)
        {
            return false;
        }
        if let Some(chapter) = &self.chapter
            && !contains_ignore_case(&question.chapter, chapter)
        {
            return false;
        }
        if let Some(difficulty) = self.difficulty
            && question.difficulty != difficulty
        {
            return false;
        }
        if let Some(concept) = &self.concept {
            let concept = concept.trim();
            if !concept.is_empty()
                && !contains_ignore_case(&question.text, concept)
                && !contains_ignore_case(&question.subject, concept)
                && !contains_ignore_case(&question.chapter, concept)
            {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Subjects and chapters offered in the question panel
pub fn course_catalog() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        ("Mathematics", &["Calculus", "Algebra", "Linear Equations"]),
        ("Physics", &["Mechanics", "Thermodynamics", "Electricity"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(subject: &str, chapter: &str, text: &str, difficulty: Difficulty) -> Question {
        Question {
            id: "x".to_string(),
            text: text.to_string(),
            options: vec![],
            difficulty,
            subject: subject.to_string(),
            chapter: chapter.to_string(),
            solution: None,
        }
    }

    #[test]
    fn test_default_criteria_match_everything() {
        let q = question("Physics", "Mechanics", "How high?", Difficulty::Hard);
        assert!(SelectionCriteria::default().matches(&q));
    }

    #[test]
    fn test_concept_matches_text_subject_or_chapter() {
        let q = question("Mathematics", "Calculus", "What is the derivative of x?", Difficulty::Easy);
        let mut criteria = SelectionCriteria {
            concept: Some("DERIVATIVE".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&q));
        criteria.concept = Some("calc".to_string());
        assert!(criteria.matches(&q));
        criteria.concept = Some("momentum".to_string());
        assert!(!criteria.matches(&q));
    }

    #[test]
    fn test_subject_chapter_and_difficulty_filters() {
        let q = question("Mathematics", "Calculus", "d/dx", Difficulty::Medium);
        let criteria = SelectionCriteria {
            subject: Some("mathematics".to_string()),
            chapter: Some("calculus".to_string()),
            difficulty: Some(Difficulty::Medium),
            ..Default::default()
        };
        assert!(criteria.matches(&q));

        let wrong_difficulty = SelectionCriteria {
            difficulty: Some(Difficulty::Easy),
            ..criteria.clone()
        };
        assert!(!wrong_difficulty.matches(&q));

        let wrong_subject = SelectionCriteria {
            subject: Some("Physics".to_string()),
            ..criteria
        };
        assert!(!wrong_subject.matches(&q));
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
    }
}
