use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::overlay::MarkerKind;
use crate::session::{CheckOutcome, HintPanel, HintPhase, SessionCoordinator, VoiceIntent, VoiceStatus};
use crate::theme;

/// Headline for an outcome
pub fn outcome_summary(outcome: &CheckOutcome) -> String {
    if outcome.steps.is_empty() {
        return "Nothing to check yet. Write your steps on the canvas.".to_string();
    }
    match outcome.steps.iter().position(|s| !s.is_correct) {
        Some(index) => format!("Step {} needs another look.", index + 1),
        None if outcome.steps.len() == 1 => "Your step looks correct!".to_string(),
        None => format!("All {} steps look correct!", outcome.steps.len()),
    }
}

fn kind_color(kind: MarkerKind) -> egui::Color32 {
    match kind {
        MarkerKind::Correct => theme::ui::marker::CORRECT_TEXT,
        MarkerKind::Error => theme::ui::marker::ERROR_TEXT,
        MarkerKind::Warning => theme::ui::marker::WARNING_TEXT,
    }
}

fn voice_label(status: &VoiceStatus) -> Option<String> {
    if status.is_listening {
        return Some("Listening...".to_string());
    }
    let transcript = status.last_transcript.as_ref()?;
    let action = match status.last_intent {
        Some(VoiceIntent::CheckRequested) => "checking your work",
        Some(VoiceIntent::HintRequested) => "getting a hint",
        _ => "no action",
    };
    Some(format!("Heard \"{}\" ({})", transcript, action))
}

/// Right panel: check outcome, hint card and voice status
pub fn feedback_panel_ui(
    mut contexts: EguiContexts,
    coordinator: Res<SessionCoordinator>,
    mut hint_panel: ResMut<HintPanel>,
    voice_status: Res<VoiceStatus>,
) -> Result {
    egui::SidePanel::right("feedback_panel")
        .default_width(260.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Feedback").heading().size(18.0));
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            if coordinator.question().is_none() {
                ui.label(egui::RichText::new("Select a question to get feedback.").weak());
            } else if coordinator.is_checking() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Checking your work...");
                });
            } else if let Some(outcome) = coordinator.outcome() {
                outcome_card(ui, outcome);
            } else {
                ui.label(
                    egui::RichText::new("Your work is checked as you write. Press Check any time.")
                        .color(theme::ui::HINT_TEXT),
                );
            }

            ui.add_space(12.0);
            hint_card(ui, &mut hint_panel);

            if let Some(label) = voice_label(&voice_status) {
                ui.add_space(12.0);
                ui.separator();
                ui.label(egui::RichText::new(label).size(12.0).italics());
            }
        });
    Ok(())
}

fn outcome_card(ui: &mut egui::Ui, outcome: &CheckOutcome) {
    let headline_color = if outcome.has_error {
        theme::ui::marker::ERROR_TEXT
    } else if outcome.steps.is_empty() {
        theme::ui::HINT_TEXT
    } else {
        theme::ui::marker::CORRECT_TEXT
    };
    ui.label(
        egui::RichText::new(outcome_summary(outcome))
            .strong()
            .color(headline_color),
    );

    for (i, step) in outcome.steps.iter().enumerate() {
        let kind = MarkerKind::for_step(step.is_correct, step.warning_message.is_some());
        ui.horizontal_wrapped(|ui| {
            ui.label(
                egui::RichText::new(format!("{} Step {}", kind.glyph(), i + 1))
                    .color(kind_color(kind))
                    .strong(),
            );
            if let Some(message) = step.error_message.as_ref().or(step.warning_message.as_ref()) {
                ui.label(egui::RichText::new(message).size(12.0));
            }
        });
    }

    if let Some(hint) = &outcome.hint_message {
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(hint)
                .size(12.0)
                .color(theme::ui::WARNING_TEXT),
        );
    }
}

fn hint_card(ui: &mut egui::Ui, hint_panel: &mut HintPanel) {
    let mut toggle = false;
    let mut close = false;

    match hint_panel.phase() {
        HintPhase::Hidden => return,
        HintPhase::Generating { .. } => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Thinking of a hint...");
            });
        }
        HintPhase::Shown {
            message, expanded, ..
        } => {
            egui::Frame::new()
                .fill(theme::ui::HINT_BACKGROUND)
                .corner_radius(6.0)
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new("Hint")
                                .strong()
                                .color(theme::ui::HINT_BODY_TEXT),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").on_hover_text("Close").clicked() {
                                close = true;
                            }
                            let label = if *expanded { "Hide" } else { "Show" };
                            if ui.small_button(label).clicked() {
                                toggle = true;
                            }
                        });
                    });
                    if *expanded {
                        ui.label(egui::RichText::new(message).color(theme::ui::HINT_BODY_TEXT));
                    }
                });
        }
    }

    if close {
        hint_panel.close();
    } else if toggle {
        hint_panel.toggle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::StepCheck;

    #[test]
    fn test_summary_for_empty_outcome() {
        assert!(outcome_summary(&CheckOutcome::neutral()).starts_with("Nothing to check"));
    }

    #[test]
    fn test_summary_names_first_error() {
        let outcome = CheckOutcome::from_steps(vec![
            StepCheck::correct("a"),
            StepCheck::incorrect("b", "x"),
            StepCheck::incorrect("c", "y"),
        ]);
        assert_eq!(outcome_summary(&outcome), "Step 2 needs another look.");
    }

    #[test]
    fn test_summary_all_correct() {
        let one = CheckOutcome::from_steps(vec![StepCheck::correct("a")]);
        assert_eq!(outcome_summary(&one), "Your step looks correct!");
        let two = CheckOutcome::from_steps(vec![StepCheck::correct("a"), StepCheck::correct("b")]);
        assert_eq!(outcome_summary(&two), "All 2 steps look correct!");
    }

    #[test]
    fn test_voice_label() {
        let mut status = VoiceStatus::default();
        assert!(voice_label(&status).is_none());
        status.is_listening = true;
        assert_eq!(voice_label(&status).as_deref(), Some("Listening..."));
        status.is_listening = false;
        status.last_transcript = Some("give me a hint".to_string());
        status.last_intent = Some(VoiceIntent::HintRequested);
        assert_eq!(
            voice_label(&status).as_deref(),
            Some("Heard \"give me a hint\" (getting a hint)")
        );
    }
}
