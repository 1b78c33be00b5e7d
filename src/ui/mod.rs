mod dialogs;
mod feedback;
mod file_menu;
mod question_panel;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::{ConfigResetNotification, MissingDrawingWarning};
use crate::persistence::{AsyncDrawingOperation, DrawingIoError};

/// Resource that tracks whether any modal dialog is currently open.
/// Canvas input handlers check this so strokes never start under a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block canvas input
    pub any_modal_open: bool,
}

/// System to aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    file_menu: Res<file_menu::FileMenuState>,
    missing_drawing: Res<MissingDrawingWarning>,
    config_reset: Res<ConfigResetNotification>,
    io_error: Res<DrawingIoError>,
    async_op: Res<AsyncDrawingOperation>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = missing_drawing.show
        || config_reset.show
        || io_error.message.is_some()
        || async_op.is_busy()
        || file_menu.any_dialog_pending();
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<file_menu::FileMenuState>()
            .init_resource::<question_panel::QuestionPanelState>()
            // Top panels first so side panels fit below them
            .add_systems(
                EguiPrimaryContextPass,
                (
                    toolbar::toolbar_ui,
                    toolbar::brush_settings_ui,
                    question_panel::question_panel_ui,
                    feedback::feedback_panel_ui,
                )
                    .chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Last: dialogs/overlays
                    dialogs::missing_drawing_warning_ui,
                    dialogs::config_reset_notification_ui,
                    dialogs::drawing_io_error_ui,
                    dialogs::async_operation_modal_ui,
                )
                    .after(feedback::feedback_panel_ui),
            )
            .add_systems(Update, file_menu::poll_file_dialogs)
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}
