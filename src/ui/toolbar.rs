use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::file_menu::{file_menu_contents, FileMenuState};
use crate::canvas::{CanvasAction, DrawingSurface, DrawingTool};
use crate::config::{AppConfig, UpdateBrushDefaultsRequest};
use crate::constants::STROKE_WIDTH_PRESETS;
use crate::persistence::{AsyncDrawingOperation, CurrentDrawingFile, LoadDrawingRequest, SaveDrawingRequest};
use crate::session::{
    CheckRequested, HintPanel, HintRequested, ListenRequested, SessionCoordinator, VoiceStatus,
};
use crate::theme;

/// Session state and requests reachable from the toolbar
#[derive(SystemParam)]
pub struct SessionControls<'w> {
    pub coordinator: Res<'w, SessionCoordinator>,
    pub hint_panel: Res<'w, HintPanel>,
    pub voice_status: Res<'w, VoiceStatus>,
    pub check_events: MessageWriter<'w, CheckRequested>,
    pub hint_events: MessageWriter<'w, HintRequested>,
    pub listen_events: MessageWriter<'w, ListenRequested>,
}

/// Drawing file state used by the File menu
#[derive(SystemParam)]
pub struct FileControls<'w> {
    pub menu_state: ResMut<'w, FileMenuState>,
    pub current_file: Res<'w, CurrentDrawingFile>,
    pub config: Res<'w, AppConfig>,
    pub async_op: Res<'w, AsyncDrawingOperation>,
    pub save_events: MessageWriter<'w, SaveDrawingRequest>,
    pub load_events: MessageWriter<'w, LoadDrawingRequest>,
}

/// Main toolbar: file menu, tools, history and session buttons
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut surface: ResMut<DrawingSurface>,
    mut actions: MessageWriter<CanvasAction>,
    mut brush_defaults: MessageWriter<UpdateBrushDefaultsRequest>,
    mut session: SessionControls,
    mut files: FileControls,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                ui.menu_button("File", |ui| {
                    let question_id = session.coordinator.question().map(|q| q.id.as_str());
                    file_menu_contents(
                        ui,
                        &mut files.menu_state,
                        &files.current_file,
                        &files.config,
                        &files.async_op,
                        question_id,
                        &mut files.save_events,
                        &mut files.load_events,
                    );
                });

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                // Tool buttons with keyboard shortcuts
                for tool in DrawingTool::all() {
                    let selected = surface.brush().tool == *tool;
                    let button = egui::Button::new(
                        egui::RichText::new(tool.display_name()).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(selected);

                    if ui.add(button).clicked() && !selected {
                        surface.set_tool(*tool);
                        brush_defaults.write(UpdateBrushDefaultsRequest {
                            brush: surface.brush(),
                        });
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add_enabled(surface.can_undo(), egui::Button::new("Undo"))
                    .on_hover_text("Ctrl+Z")
                    .clicked()
                {
                    actions.write(CanvasAction::Undo);
                }
                if ui
                    .add_enabled(surface.can_redo(), egui::Button::new("Redo"))
                    .on_hover_text("Ctrl+Y / Ctrl+Shift+Z")
                    .clicked()
                {
                    actions.write(CanvasAction::Redo);
                }
                if ui
                    .add_enabled(surface.can_clear(), egui::Button::new("Clear"))
                    .on_hover_text("Ctrl+Backspace")
                    .clicked()
                {
                    actions.write(CanvasAction::Clear);
                }

                // Right-aligned session controls
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let has_question = session.coordinator.question().is_some();

                    let listening = session.voice_status.is_listening;
                    let listen_label = if listening { "Listening..." } else { "Listen" };
                    if ui
                        .add_enabled(!listening, egui::Button::new(listen_label))
                        .on_hover_text("Say \"check my work\" or \"give me a hint\"")
                        .clicked()
                    {
                        session.listen_events.write(ListenRequested);
                    }

                    let can_hint = has_question && !session.hint_panel.is_generating();
                    if ui.add_enabled(can_hint, egui::Button::new("Hint")).clicked() {
                        session.hint_events.write(HintRequested);
                    }

                    let can_check = has_question && !session.coordinator.is_checking();
                    if ui
                        .add_enabled(can_check, egui::Button::new(egui::RichText::new("Check").strong()))
                        .clicked()
                    {
                        session.check_events.write(CheckRequested);
                    }
                });
            });
        });
    Ok(())
}

/// Secondary bar with ink colour and stroke width
pub fn brush_settings_ui(
    mut contexts: EguiContexts,
    mut surface: ResMut<DrawingSurface>,
    mut brush_defaults: MessageWriter<UpdateBrushDefaultsRequest>,
) -> Result {
    let brush_before = surface.brush();

    egui::TopBottomPanel::top("brush_settings")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6))
                .fill(theme::ui::PANEL_BACKGROUND),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;

                let is_eraser = surface.brush().tool.is_eraser();
                ui.add_enabled_ui(!is_eraser, |ui| {
                    ui.label(egui::RichText::new("Color:").color(theme::ui::LABEL_TEXT));
                    for (color, name) in theme::ink_palette() {
                        let is_selected = surface.brush().color == color;
                        let button = egui::Button::new("")
                            .fill(theme::rgb_to_egui(color))
                            .min_size(egui::vec2(18.0, 18.0))
                            .stroke(if is_selected {
                                egui::Stroke::new(2.0, theme::ui::SELECTED_BORDER)
                            } else {
                                egui::Stroke::new(1.0, theme::ui::UNSELECTED_BORDER)
                            });

                        let response = ui.add(button);
                        if response.clicked() {
                            surface.set_color(color);
                        }
                        response.on_hover_text(name);
                    }
                });

                ui.add_space(12.0);
                ui.separator();
                ui.add_space(12.0);

                ui.label(egui::RichText::new("Width:").color(theme::ui::LABEL_TEXT));
                for width in STROKE_WIDTH_PRESETS {
                    let selected = (surface.brush().width - width).abs() < f32::EPSILON;
                    if ui
                        .add(egui::Button::new(format!("{}", width)).selected(selected))
                        .clicked()
                    {
                        surface.set_width(width);
                    }
                }

                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new("P/M/H/E: switch tools")
                        .color(theme::ui::HINT_TEXT)
                        .size(11.0),
                );
            });
        });

    if surface.brush() != brush_before {
        brush_defaults.write(UpdateBrushDefaultsRequest {
            brush: surface.brush(),
        });
    }
    Ok(())
}
