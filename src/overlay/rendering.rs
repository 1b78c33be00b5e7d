use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::markers::{layout_markers, MarkerKind, PlacedMarker};
use super::state::OverlayState;
use crate::constants::{MARKER_MESSAGE_OFFSET_Y, MARKER_MESSAGE_WIDTH, MARKER_SIZE};
use crate::session::{CheckResolved, QuestionChanged, SessionCoordinator};
use crate::theme;

fn marker_colors(kind: MarkerKind) -> (egui::Color32, egui::Color32) {
    match kind {
        MarkerKind::Correct => (theme::ui::marker::CORRECT, theme::ui::marker::CORRECT_TEXT),
        MarkerKind::Error => (theme::ui::marker::ERROR, theme::ui::marker::ERROR_TEXT),
        MarkerKind::Warning => (theme::ui::marker::WARNING, theme::ui::marker::WARNING_TEXT),
    }
}

pub fn reset_on_question_change(
    mut events: MessageReader<QuestionChanged>,
    mut overlay: ResMut<OverlayState>,
) {
    if events.read().count() > 0 {
        overlay.reset();
    }
}

pub fn reveal_on_check_resolved(
    mut events: MessageReader<CheckResolved>,
    mut overlay: ResMut<OverlayState>,
) {
    for event in events.read() {
        overlay.reveal_first_error(&event.outcome);
    }
}

/// Draw a marker per verdict of the last outcome, with its message panel when open
pub fn overlay_ui(
    mut contexts: EguiContexts,
    coordinator: Res<SessionCoordinator>,
    mut overlay: ResMut<OverlayState>,
) -> Result {
    let Some(outcome) = coordinator.outcome() else {
        return Ok(());
    };
    if outcome.steps.is_empty() {
        return Ok(());
    }

    let markers = layout_markers(&outcome.steps, coordinator.checked_regions());
    let ctx = contexts.ctx_mut()?;
    for marker in &markers {
        if marker_button(ctx, marker) {
            overlay.toggle(&marker.region_id);
        }
        if overlay.is_expanded(&marker.region_id) {
            message_panel(ctx, marker);
        }
    }
    Ok(())
}

/// Returns true when clicked
fn marker_button(ctx: &egui::Context, marker: &PlacedMarker) -> bool {
    let (fill, _) = marker_colors(marker.kind);
    egui::Area::new(egui::Id::new(("marker", &marker.region_id)))
        .fixed_pos(egui::pos2(marker.position.x, marker.position.y))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let button = egui::Button::new(
                egui::RichText::new(marker.kind.glyph())
                    .strong()
                    .color(egui::Color32::WHITE),
            )
            .fill(fill)
            .corner_radius(MARKER_SIZE / 2.0)
            .min_size(egui::vec2(MARKER_SIZE, MARKER_SIZE));
            ui.add(button).clicked()
        })
        .inner
}

fn message_panel(ctx: &egui::Context, marker: &PlacedMarker) {
    let (border, text) = marker_colors(marker.kind);
    let pos = egui::pos2(marker.position.x, marker.position.y + MARKER_MESSAGE_OFFSET_Y);
    egui::Area::new(egui::Id::new(("marker_message", &marker.region_id)))
        .fixed_pos(pos)
        .order(egui::Order::Foreground)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .stroke(egui::Stroke::new(1.0, border))
                .show(ui, |ui| {
                    ui.set_max_width(MARKER_MESSAGE_WIDTH);
                    ui.label(egui::RichText::new(&marker.message).color(text));
                });
        });
}
