use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::collaborators::{
    course_catalog, reference_solution, Difficulty, Question, SelectionCriteria, SAMPLE_SCAN_TEXT,
};
use crate::session::{
    FetchQuestionsRequest, QuestionList, SelectQuestionRequest, SessionCoordinator,
    UploadQuestionRequest,
};
use crate::theme;

/// Editable copies of the criteria and upload text
#[derive(Resource, Default)]
pub struct QuestionPanelState {
    pub criteria: SelectionCriteria,
    pub concept: String,
    pub upload_text: String,
}

impl QuestionPanelState {
    /// Criteria to send, with the concept box folded in
    pub fn criteria_for_fetch(&self) -> SelectionCriteria {
        let concept = self.concept.trim();
        SelectionCriteria {
            concept: (!concept.is_empty()).then(|| concept.to_string()),
            ..self.criteria.clone()
        }
    }
}

/// One-line preview of a question for the list
pub fn question_preview(question: &Question, max_chars: usize) -> String {
    let first_line = question.text.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut.trim_end())
    } else {
        first_line.to_string()
    }
}

fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

pub fn question_panel_ui(
    mut contexts: EguiContexts,
    mut panel: ResMut<QuestionPanelState>,
    question_list: Res<QuestionList>,
    coordinator: Res<SessionCoordinator>,
    mut fetch_events: MessageWriter<FetchQuestionsRequest>,
    mut select_events: MessageWriter<SelectQuestionRequest>,
    mut upload_events: MessageWriter<UploadQuestionRequest>,
) -> Result {
    egui::SidePanel::left("question_panel")
        .default_width(300.0)
        .show(contexts.ctx_mut()?, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Question").heading().size(18.0));
                ui.add_space(4.0);
                ui.separator();

                // =========================================
                // ACTIVE QUESTION
                // =========================================
                match coordinator.question() {
                    Some(question) => {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} / {} - {}",
                                question.subject,
                                question.chapter,
                                question.difficulty.display_name()
                            ))
                            .size(11.0)
                            .color(theme::ui::HINT_TEXT),
                        );
                        ui.add_space(2.0);
                        ui.label(egui::RichText::new(&question.text).size(15.0).strong());
                        ui.add_space(4.0);
                        for (i, option) in question.options.iter().enumerate() {
                            ui.label(format!("{}) {}", option_label(i), option.text));
                        }
                        ui.add_space(4.0);
                        ui.collapsing("Worked solution", |ui| {
                            solution_steps(ui, question);
                        });
                        if ui.small_button("Deselect").clicked() {
                            select_events.write(SelectQuestionRequest { question: None });
                        }
                    }
                    None => {
                        ui.label(
                            egui::RichText::new("Pick a question below, or upload one, then work it out on the canvas.")
                                .color(theme::ui::HINT_TEXT),
                        );
                    }
                }

                ui.add_space(8.0);
                ui.separator();

                // =========================================
                // CRITERIA
                // =========================================
                ui.collapsing("Find questions", |ui| {
                    criteria_controls(ui, &mut panel);
                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(!question_list.is_fetching, egui::Button::new("Search"))
                            .clicked()
                        {
                            fetch_events.write(FetchQuestionsRequest {
                                criteria: panel.criteria_for_fetch(),
                            });
                        }
                        if question_list.is_fetching {
                            ui.spinner();
                        }
                    });
                });

                ui.add_space(4.0);

                // =========================================
                // QUESTION LIST
                // =========================================
                if question_list.questions.is_empty() && !question_list.is_fetching {
                    ui.label(egui::RichText::new("No questions match.").weak());
                }
                let active_id = coordinator.question().map(|q| q.id.as_str());
                for question in &question_list.questions {
                    let selected = active_id == Some(question.id.as_str());
                    let response = ui
                        .selectable_label(selected, question_preview(question, 48))
                        .on_hover_text(&question.text);
                    if response.clicked() && !selected {
                        select_events.write(SelectQuestionRequest {
                            question: Some(question.clone()),
                        });
                    }
                }
                if let Some(error) = &question_list.error {
                    ui.colored_label(theme::ui::ERROR_TEXT, error);
                }

                ui.add_space(8.0);
                ui.separator();

                // =========================================
                // UPLOAD
                // =========================================
                ui.collapsing("Upload a question", |ui| {
                    ui.label(
                        egui::RichText::new("Paste the question text with options on lines starting A) to D).")
                            .size(11.0)
                            .color(theme::ui::HINT_TEXT),
                    );
                    ui.add(
                        egui::TextEdit::multiline(&mut panel.upload_text)
                            .desired_rows(6)
                            .desired_width(f32::INFINITY),
                    );
                    ui.horizontal(|ui| {
                        if ui.button("Use sample scan").clicked() {
                            panel.upload_text = SAMPLE_SCAN_TEXT.to_string();
                        }
                        let has_text = !panel.upload_text.trim().is_empty();
                        if ui.add_enabled(has_text, egui::Button::new("Use this question")).clicked() {
                            upload_events.write(UploadQuestionRequest {
                                text: panel.upload_text.clone(),
                            });
                        }
                    });
                });
            });
        });
    Ok(())
}

fn solution_steps(ui: &mut egui::Ui, question: &Question) {
    let solution = reference_solution(question);
    for step in &solution.steps {
        ui.label(format!("{}. {}", step.id, step.content));
        ui.label(egui::RichText::new(&step.latex).monospace().size(11.0).weak());
        ui.add_space(2.0);
    }
    if let Some(explanation) = &solution.explanation {
        ui.add_space(4.0);
        ui.label(egui::RichText::new(explanation).italics());
    }
}

fn criteria_controls(ui: &mut egui::Ui, panel: &mut QuestionPanelState) {
    let criteria = &mut panel.criteria;

    egui::Grid::new("criteria_grid").num_columns(2).show(ui, |ui| {
        ui.label("Subject:");
        egui::ComboBox::from_id_salt("criteria_subject")
            .selected_text(criteria.subject.as_deref().unwrap_or("Any"))
            .show_ui(ui, |ui| {
                if ui.selectable_label(criteria.subject.is_none(), "Any").clicked() {
                    criteria.subject = None;
                    criteria.chapter = None;
                }
                for (subject, _) in course_catalog() {
                    let selected = criteria.subject.as_deref() == Some(*subject);
                    if ui.selectable_label(selected, *subject).clicked() && !selected {
                        criteria.subject = Some(subject.to_string());
                        criteria.chapter = None;
                    }
                }
            });
        ui.end_row();

        ui.label("Chapter:");
        let chapters: &[&str] = criteria
            .subject
            .as_deref()
            .and_then(|s| course_catalog().iter().find(|(subject, _)| *subject == s))
            .map(|(_, chapters)| *chapters)
            .unwrap_or(&[]);
        ui.add_enabled_ui(!chapters.is_empty(), |ui| {
            egui::ComboBox::from_id_salt("criteria_chapter")
                .selected_text(criteria.chapter.as_deref().unwrap_or("Any"))
                .show_ui(ui, |ui| {
                    if ui.selectable_label(criteria.chapter.is_none(), "Any").clicked() {
                        criteria.chapter = None;
                    }
                    for chapter in chapters {
                        let selected = criteria.chapter.as_deref() == Some(*chapter);
                        if ui.selectable_label(selected, *chapter).clicked() {
                            criteria.chapter = Some(chapter.to_string());
                        }
                    }
                });
        });
        ui.end_row();

        ui.label("Difficulty:");
        egui::ComboBox::from_id_salt("criteria_difficulty")
            .selected_text(criteria.difficulty.map(|d| d.display_name()).unwrap_or("Any"))
            .show_ui(ui, |ui| {
                if ui.selectable_label(criteria.difficulty.is_none(), "Any").clicked() {
                    criteria.difficulty = None;
                }
                for difficulty in Difficulty::all() {
                    let selected = criteria.difficulty == Some(*difficulty);
                    if ui.selectable_label(selected, difficulty.display_name()).clicked() {
                        criteria.difficulty = Some(*difficulty);
                    }
                }
            });
        ui.end_row();

        ui.label("Concept:");
        ui.text_edit_singleline(&mut panel.concept);
        ui.end_row();

        ui.label("Count:");
        ui.add(egui::DragValue::new(&mut criteria.count).range(1..=20));
        ui.end_row();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> Question {
        Question {
            id: "q".to_string(),
            text: text.to_string(),
            options: Vec::new(),
            difficulty: Difficulty::Medium,
            subject: "Mathematics".to_string(),
            chapter: "Calculus".to_string(),
            solution: None,
        }
    }

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(question_preview(&question("Find dy/dx"), 20), "Find dy/dx");
    }

    #[test]
    fn test_preview_truncates_and_uses_first_line() {
        let q = question("What is the derivative of f(x) = 3x^2 + 2x?\nMore detail");
        let preview = question_preview(&q, 20);
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 20);
        assert!(!preview.contains('\n'));
    }

    #[test]
    fn test_blank_concept_is_not_sent() {
        let mut panel = QuestionPanelState::default();
        panel.concept = "   ".to_string();
        assert!(panel.criteria_for_fetch().concept.is_none());
        panel.concept = " power rule ".to_string();
        assert_eq!(panel.criteria_for_fetch().concept.as_deref(), Some("power rule"));
    }

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
    }
}
