//! Built-in question bank used when no remote question source is configured.

use std::sync::atomic::{AtomicU64, Ordering};

use super::question::{Difficulty, Question, QuestionOption, SelectionCriteria, Solution, SolutionStep};
use super::{CollaboratorError, QuestionSource};

pub struct QuestionBank {
    questions: Vec<Question>,
    /// Keeps generated question ids unique for the whole session
    generated: AtomicU64,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new(sample_questions())
    }
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            generated: AtomicU64::new(0),
        }
    }

    #[cfg(test)]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Filler question used when the bank has fewer matches than requested
    fn generate(&self, criteria: &SelectionCriteria, index: usize) -> Question {
        let serial = self.generated.fetch_add(1, Ordering::Relaxed);
        let concept = criteria
            .concept
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("general concept");

        let labels = ["First option", "Second option", "Third option", "Fourth option"];
        let options = ["A", "B", "C", "D"]
            .iter()
            .zip(labels)
            .enumerate()
            .map(|(i, (id, text))| QuestionOption {
                id: id.to_string(),
                text: text.to_string(),
                is_correct: i == index % 4,
            })
            .collect();

        Question {
            id: format!("generated-{}", serial),
            text: format!("Question about {} ({})", concept, index + 1),
            options,
            difficulty: criteria.difficulty.unwrap_or_default(),
            subject: criteria.subject.clone().unwrap_or_else(|| "Mathematics".to_string()),
            chapter: criteria.chapter.clone().unwrap_or_else(|| "General".to_string()),
            solution: None,
        }
    }
}

impl QuestionSource for QuestionBank {
    fn fetch(&self, criteria: &SelectionCriteria) -> Result<Vec<Question>, CollaboratorError> {
        let mut matches: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| criteria.matches(q))
            .cloned()
            .collect();

        let missing = criteria.count.saturating_sub(matches.len());
        for i in 0..missing {
            matches.push(self.generate(criteria, i));
        }
        matches.truncate(criteria.count);
        Ok(matches)
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<Question>, CollaboratorError> {
        Ok(self.questions.iter().find(|q| q.id == id).cloned())
    }
}

/// The question's own worked solution, or a generic one when it has none
pub fn reference_solution(question: &Question) -> Solution {
    question.solution.clone().unwrap_or_else(fallback_solution)
}

fn fallback_solution() -> Solution {
    Solution {
        steps: vec![
            step(1, "First, identify the function to be differentiated.", "f(x) = x^3 + 2x^2 - 4x + 7"),
            step(
                2,
                "Apply the power rule to each term.",
                "f'(x) = \\frac{d}{dx}(x^3) + \\frac{d}{dx}(2x^2) - \\frac{d}{dx}(4x) + \\frac{d}{dx}(7)",
            ),
            step(
                3,
                "The power rule states that the derivative of x^n is n*x^(n-1).",
                "f'(x) = 3x^2 + 2 \\cdot 2x^1 - 4 \\cdot 1 + 0",
            ),
            step(4, "Simplify the expression.", "f'(x) = 3x^2 + 4x - 4"),
        ],
        explanation: None,
    }
}

fn step(id: u32, content: &str, latex: &str) -> SolutionStep {
    SolutionStep {
        id,
        content: content.to_string(),
        latex: latex.to_string(),
    }
}

fn options(texts: [&str; 4], correct: usize) -> Vec<QuestionOption> {
    ["A", "B", "C", "D"]
        .iter()
        .zip(texts)
        .enumerate()
        .map(|(i, (id, text))| QuestionOption {
            id: id.to_string(),
            text: text.to_string(),
            is_correct: i == correct,
        })
        .collect()
}

fn sample_questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".to_string(),
            text: "What is the derivative of f(x) = x³ + 2x² - 4x + 7?".to_string(),
            options: options(["3x² + 4x - 4", "3x² + 2x - 4", "3x² + 4x", "x³ + 4x - 4"], 0),
            difficulty: Difficulty::Medium,
            subject: "Mathematics".to_string(),
            chapter: "Calculus".to_string(),
            solution: Some(Solution {
                steps: vec![
                    step(
                        1,
                        "Apply the power rule for each term",
                        "f'(x) = \\frac{d}{dx}(x^3) + \\frac{d}{dx}(2x^2) - \\frac{d}{dx}(4x) + \\frac{d}{dx}(7)",
                    ),
                    step(2, "Compute the derivative of each term", "f'(x) = 3x^2 + 2 \\cdot 2x^1 - 4 \\cdot 1 + 0"),
                    step(3, "Simplify", "f'(x) = 3x^2 + 4x - 4"),
                ],
                explanation: None,
            }),
        },
        Question {
            id: "q2".to_string(),
            text: "What is the derivative of f(x) = 3x² - 2x + 5?".to_string(),
            options: options(["6x - 2", "3x - 2", "6x - 2 + 5", "6x² - 2"], 0),
            difficulty: Difficulty::Easy,
            subject: "Mathematics".to_string(),
            chapter: "Calculus".to_string(),
            solution: Some(Solution {
                steps: vec![
                    step(1, "Identify the function to differentiate", "f(x) = 3x^2 - 2x + 5"),
                    step(
                        2,
                        "Apply the power rule to each term",
                        "f'(x) = \\frac{d}{dx}(3x^2) - \\frac{d}{dx}(2x) + \\frac{d}{dx}(5)",
                    ),
                    step(3, "Calculate the derivative of each term", "f'(x) = 3 \\cdot 2x^1 - 2 \\cdot 1 + 0"),
                    step(4, "Simplify the expression", "f'(x) = 6x - 2"),
                ],
                explanation: None,
            }),
        },
        Question {
            id: "q3".to_string(),
            text: "What is the derivative of f(x) = sin(x) + cos(x)?".to_string(),
            options: options(["cos(x) - sin(x)", "cos(x) + sin(x)", "-sin(x) - cos(x)", "sin(x) - cos(x)"], 0),
            difficulty: Difficulty::Medium,
            subject: "Mathematics".to_string(),
            chapter: "Calculus".to_string(),
            solution: Some(Solution {
                steps: vec![
                    step(1, "Identify the function to differentiate", "f(x) = \\sin(x) + \\cos(x)"),
                    step(
                        2,
                        "Apply the derivative rules for trigonometric functions",
                        "f'(x) = \\frac{d}{dx}(\\sin(x)) + \\frac{d}{dx}(\\cos(x))",
                    ),
                    step(
                        3,
                        "Use the rules: d/dx(sin(x)) = cos(x) and d/dx(cos(x)) = -sin(x)",
                        "f'(x) = \\cos(x) - \\sin(x)",
                    ),
                ],
                explanation: None,
            }),
        },
        Question {
            id: "p1".to_string(),
            text: "A ball is thrown vertically upward with an initial velocity of 20 m/s. How high will it go?"
                .to_string(),
            options: options(["20.4 m", "10.2 m", "40.8 m", "30.6 m"], 0),
            difficulty: Difficulty::Medium,
            subject: "Physics".to_string(),
            chapter: "Mechanics".to_string(),
            solution: Some(Solution {
                steps: vec![
                    step(1, "Identify the relevant kinematic equation", "v_f^2 = v_i^2 + 2a\\Delta x"),
                    step(
                        2,
                        "At the highest point, final velocity is zero",
                        "0 = (20 \\text{ m/s})^2 + 2(-9.8 \\text{ m/s}^2)\\Delta x",
                    ),
                    step(
                        3,
                        "Solve for Δx",
                        "\\Delta x = \\frac{(20 \\text{ m/s})^2}{2(9.8 \\text{ m/s}^2)} = 20.4 \\text{ m}",
                    ),
                ],
                explanation: None,
            }),
        },
    ]
}
