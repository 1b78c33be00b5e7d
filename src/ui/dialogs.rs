use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::{AppConfig, ConfigResetNotification, MissingDrawingWarning, SaveConfigRequest};
use crate::persistence::{AsyncDrawingOperation, DrawingIoError};
use crate::theme;

/// Shorten long paths from the left so the file name stays visible
pub fn display_path(path: &str, max_chars: usize) -> String {
    let count = path.chars().count();
    if count <= max_chars {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - max_chars.saturating_sub(3)).collect();
    format!("...{}", tail)
}

/// Shown at startup if the last drawing file no longer exists
pub fn missing_drawing_warning_ui(
    mut contexts: EguiContexts,
    mut warning: ResMut<MissingDrawingWarning>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) -> Result {
    if !warning.show {
        return Ok(());
    }

    egui::Window::new("Drawing Not Found")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("The last saved drawing no longer exists:");

            if let Some(ref path) = warning.path {
                ui.add_space(5.0);
                let path_str = path.to_string_lossy();
                ui.label(egui::RichText::new(display_path(&path_str, 50)).weak())
                    .on_hover_text(path_str.as_ref());
                ui.add_space(10.0);
            }

            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    warning.show = false;
                }

                if ui.button("Clear from history").clicked() {
                    config.data.last_drawing_path = None;
                    config.dirty = true;
                    save_events.write(SaveConfigRequest);
                    warning.show = false;
                }
            });
        });

    Ok(())
}

pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(reason) = &notification.reason {
                ui.add_space(5.0);
                ui.label(egui::RichText::new(reason).weak().size(12.0));
            }
            ui.add_space(10.0);
            if ui.button("OK").clicked() {
                notification.show = false;
                notification.reason = None;
            }
        });

    Ok(())
}

pub fn drawing_io_error_ui(mut contexts: EguiContexts, mut io_error: ResMut<DrawingIoError>) -> Result {
    let Some(message) = io_error.message.clone() else {
        return Ok(());
    };

    egui::Window::new("File Error")
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                ui.colored_label(theme::ui::ERROR_TEXT, message);
            });
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                io_error.message = None;
            }
        });

    Ok(())
}

/// Small modal while a drawing file operation runs
pub fn async_operation_modal_ui(
    mut contexts: EguiContexts,
    async_op: Res<AsyncDrawingOperation>,
) -> Result {
    if !async_op.is_busy() {
        return Ok(());
    }

    egui::Window::new("Working")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(async_op.operation_description.as_deref().unwrap_or("Working..."));
            });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_path_unchanged() {
        assert_eq!(display_path("drawings/q1.json", 50), "drawings/q1.json");
    }

    #[test]
    fn test_long_path_keeps_tail() {
        let long = format!("{}/q1.json", "a".repeat(80));
        let shown = display_path(&long, 20);
        assert!(shown.starts_with("..."));
        assert!(shown.ends_with("q1.json"));
        assert_eq!(shown.chars().count(), 20);
    }
}
