use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use bevy_egui::egui;
use futures_lite::future;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::paths::{drawings_dir, sanitize_filename};
use crate::persistence::{
    AsyncDrawingOperation, CurrentDrawingFile, ExportPngRequest, LoadDrawingRequest,
    SaveDrawingRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDialogPurpose {
    Save,
    Open,
    Export,
}

#[derive(Resource, Default)]
pub struct FileMenuState {
    /// Native file dialog in progress
    pub pending_dialog: Option<(FileDialogPurpose, Task<Option<PathBuf>>)>,
}

impl FileMenuState {
    pub fn any_dialog_pending(&self) -> bool {
        self.pending_dialog.is_some()
    }

    fn open_dialog(&mut self, purpose: FileDialogPurpose, file_name: String) {
        if self.pending_dialog.is_some() {
            return;
        }
        let task_pool = AsyncComputeTaskPool::get();
        let task = task_pool.spawn(async move {
            let dialog = rfd::AsyncFileDialog::new().set_directory(drawings_dir());
            let handle = match purpose {
                FileDialogPurpose::Save => {
                    dialog
                        .set_title("Save Drawing")
                        .add_filter("Drawing", &["json"])
                        .set_file_name(file_name)
                        .save_file()
                        .await
                }
                FileDialogPurpose::Open => {
                    dialog
                        .set_title("Open Drawing")
                        .add_filter("Drawing", &["json"])
                        .pick_file()
                        .await
                }
                FileDialogPurpose::Export => {
                    dialog
                        .set_title("Export PNG")
                        .add_filter("PNG image", &["png"])
                        .set_file_name(file_name)
                        .save_file()
                        .await
                }
            };
            handle.map(|h| h.path().to_path_buf())
        });
        self.pending_dialog = Some((purpose, task));
    }
}

/// Suggested file name for a drawing of `question_id`
pub fn default_file_name(question_id: Option<&str>, extension: &str) -> String {
    let stem = question_id.map(sanitize_filename).unwrap_or_else(|| "drawing".to_string());
    format!("{}.{}", stem, extension)
}

/// Contents of the toolbar's File menu
#[allow(clippy::too_many_arguments)]
pub fn file_menu_contents(
    ui: &mut egui::Ui,
    menu_state: &mut FileMenuState,
    current_file: &CurrentDrawingFile,
    config: &AppConfig,
    async_op: &AsyncDrawingOperation,
    question_id: Option<&str>,
    save_events: &mut MessageWriter<SaveDrawingRequest>,
    load_events: &mut MessageWriter<LoadDrawingRequest>,
) {
    let idle = !async_op.is_busy() && !menu_state.any_dialog_pending();

    if ui.add_enabled(idle, egui::Button::new("Save")).clicked() {
        match &current_file.path {
            Some(path) => {
                save_events.write(SaveDrawingRequest { path: path.clone() });
            }
            None => menu_state.open_dialog(FileDialogPurpose::Save, default_file_name(question_id, "json")),
        }
        ui.close();
    }
    if ui.add_enabled(idle, egui::Button::new("Save As...")).clicked() {
        menu_state.open_dialog(FileDialogPurpose::Save, default_file_name(question_id, "json"));
        ui.close();
    }
    if ui.add_enabled(idle, egui::Button::new("Open...")).clicked() {
        menu_state.open_dialog(FileDialogPurpose::Open, String::new());
        ui.close();
    }
    if let Some(path) = config.data.last_drawing_path.as_ref().filter(|p| p.exists()) {
        let response = ui.add_enabled(idle, egui::Button::new("Open Last Drawing"));
        let clicked = response.clicked();
        response.on_hover_text(path.to_string_lossy());
        if clicked {
            load_events.write(LoadDrawingRequest { path: path.clone() });
            ui.close();
        }
    }

    ui.separator();

    if ui.add_enabled(idle, egui::Button::new("Export PNG...")).clicked() {
        menu_state.open_dialog(FileDialogPurpose::Export, default_file_name(question_id, "png"));
        ui.close();
    }
    if ui.button("Show Drawings Folder").clicked() {
        if let Err(e) = open::that(drawings_dir()) {
            warn!("Failed to open drawings folder: {}", e);
        }
        ui.close();
    }
}

/// Turn a finished file dialog into the matching request
pub fn poll_file_dialogs(
    mut menu_state: ResMut<FileMenuState>,
    mut save_events: MessageWriter<SaveDrawingRequest>,
    mut load_events: MessageWriter<LoadDrawingRequest>,
    mut export_events: MessageWriter<ExportPngRequest>,
) {
    let Some((purpose, task)) = menu_state.pending_dialog.as_mut() else {
        return;
    };
    let Some(result) = future::block_on(future::poll_once(task)) else {
        return;
    };
    let purpose = *purpose;
    menu_state.pending_dialog = None;

    let Some(path) = result else {
        debug!("{:?} dialog cancelled", purpose);
        return;
    };
    match purpose {
        FileDialogPurpose::Save => {
            save_events.write(SaveDrawingRequest {
                path: path.with_extension("json"),
            });
        }
        FileDialogPurpose::Open => {
            load_events.write(LoadDrawingRequest { path });
        }
        FileDialogPurpose::Export => {
            export_events.write(ExportPngRequest {
                path: path.with_extension("png"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_name_uses_question() {
        assert_eq!(default_file_name(Some("q1"), "json"), "q1.json");
        assert_eq!(default_file_name(Some("generated/3"), "png"), "generated_3.png");
    }

    #[test]
    fn test_default_file_name_without_question() {
        assert_eq!(default_file_name(None, "json"), "drawing.json");
    }
}
