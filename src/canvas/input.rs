//! Pointer, touch and keyboard input for the drawing surface.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::snapshot::DrawingSnapshot;
use super::surface::DrawingSurface;
use super::tools::DrawingTool;
use crate::config::UpdateBrushDefaultsRequest;
use crate::ui::DialogState;

/// History operations requested by shortcuts or toolbar buttons
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasAction {
    Undo,
    Redo,
    Clear,
}

/// Emitted whenever the committed drawing changes (stroke finished, undo,
/// redo, clear, restore). Resize-only repaints do not emit it.
#[derive(Message, Debug, Clone)]
pub struct DrawingChanged {
    pub snapshot: DrawingSnapshot,
}

/// Map a history shortcut to its action. Redo wins over undo when shift is held.
pub fn history_shortcut(ctrl: bool, shift: bool, just_pressed: impl Fn(KeyCode) -> bool) -> Option<CanvasAction> {
    if !ctrl {
        return None;
    }
    if just_pressed(KeyCode::KeyY) || (shift && just_pressed(KeyCode::KeyZ)) {
        Some(CanvasAction::Redo)
    } else if just_pressed(KeyCode::KeyZ) {
        Some(CanvasAction::Undo)
    } else if just_pressed(KeyCode::Backspace) {
        Some(CanvasAction::Clear)
    } else {
        None
    }
}

/// Tool selected by a bare letter key, if any
pub fn tool_shortcut(just_pressed: impl Fn(KeyCode) -> bool) -> Option<DrawingTool> {
    DrawingTool::all()
        .iter()
        .copied()
        .find(|tool| just_pressed(tool.shortcut()))
}

fn modifiers(keyboard: &ButtonInput<KeyCode>) -> (bool, bool) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);
    (ctrl, shift)
}

pub fn handle_mouse_drawing(
    mouse_button: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut surface: ResMut<DrawingSurface>,
    mut contexts: EguiContexts,
    dialog_state: Res<DialogState>,
    mut changed: MessageWriter<DrawingChanged>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let cursor_pos = window.cursor_position();

    if mouse_button.just_pressed(MouseButton::Left) {
        // Clicks on panels and markers never start a stroke
        let over_ui = contexts.ctx_mut().is_ok_and(|ctx| ctx.is_pointer_over_area());
        if !over_ui
            && !dialog_state.any_modal_open
            && let Some(pos) = cursor_pos
        {
            surface.pointer_down(pos);
        }
    } else if mouse_button.pressed(MouseButton::Left) && surface.is_drawing() {
        match cursor_pos {
            Some(pos) => surface.pointer_move(pos),
            None => {
                if let Some(snapshot) = surface.pointer_leave() {
                    changed.write(DrawingChanged { snapshot });
                }
            }
        }
    }

    if mouse_button.just_released(MouseButton::Left)
        && let Some(snapshot) = surface.pointer_up()
    {
        changed.write(DrawingChanged { snapshot });
    }
}

/// Single-finger touch drives the same gesture as the mouse; extra fingers are ignored
pub fn handle_touch_drawing(
    touches: Res<Touches>,
    mut active_touch: Local<Option<u64>>,
    mut surface: ResMut<DrawingSurface>,
    mut contexts: EguiContexts,
    dialog_state: Res<DialogState>,
    mut changed: MessageWriter<DrawingChanged>,
) {
    if let Some(id) = *active_touch {
        let ended = touches
            .iter_just_released()
            .chain(touches.iter_just_canceled())
            .any(|touch| touch.id() == id);
        if ended {
            *active_touch = None;
            if let Some(snapshot) = surface.pointer_up() {
                changed.write(DrawingChanged { snapshot });
            }
            return;
        }
        if let Some(touch) = touches.get_pressed(id) {
            surface.pointer_move(touch.position());
        }
        return;
    }

    if touches.iter().count() != 1 || dialog_state.any_modal_open {
        return;
    }
    let over_ui = contexts.ctx_mut().is_ok_and(|ctx| ctx.is_pointer_over_area());
    if over_ui {
        return;
    }
    if let Some(touch) = touches.iter_just_pressed().next()
        && surface.pointer_down(touch.position())
    {
        *active_touch = Some(touch.id());
    }
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut surface: ResMut<DrawingSurface>,
    mut contexts: EguiContexts,
    dialog_state: Res<DialogState>,
    mut brush_defaults: MessageWriter<UpdateBrushDefaultsRequest>,
) {
    if dialog_state.any_modal_open {
        return;
    }
    // Don't change tools if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let (ctrl, _) = modifiers(&keyboard);
    if ctrl {
        return;
    }

    if let Some(tool) = tool_shortcut(|key| keyboard.just_pressed(key))
        && surface.brush().tool != tool
    {
        surface.set_tool(tool);
        brush_defaults.write(UpdateBrushDefaultsRequest {
            brush: surface.brush(),
        });
    }
}

pub fn handle_history_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    dialog_state: Res<DialogState>,
    mut actions: MessageWriter<CanvasAction>,
) {
    if dialog_state.any_modal_open {
        return;
    }
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let (ctrl, shift) = modifiers(&keyboard);
    if let Some(action) = history_shortcut(ctrl, shift, |key| keyboard.just_pressed(key)) {
        actions.write(action);
    }
}

pub fn apply_canvas_actions(
    mut actions: MessageReader<CanvasAction>,
    mut surface: ResMut<DrawingSurface>,
    mut changed: MessageWriter<DrawingChanged>,
) {
    for action in actions.read() {
        let snapshot = match action {
            CanvasAction::Undo => surface.undo(),
            CanvasAction::Redo => surface.redo(),
            CanvasAction::Clear => surface.clear(),
        };
        match snapshot {
            Some(snapshot) => {
                debug!("{:?} -> revision {}", action, snapshot.revision);
                changed.write(DrawingChanged { snapshot });
            }
            None => debug!("{:?} had nothing to do", action),
        }
    }
}

/// Keep the raster the same size as the window
pub fn handle_window_resize(
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut surface: ResMut<DrawingSurface>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let width = window.width().round() as u32;
    let height = window.height().round() as u32;
    if width == 0 || height == 0 {
        // Minimized
        return;
    }
    if surface.resize(width, height) {
        debug!("Canvas resized to {}x{}", width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pressed: &[KeyCode]) -> impl Fn(KeyCode) -> bool + '_ {
        move |key| pressed.contains(&key)
    }

    #[test]
    fn test_ctrl_z_is_undo() {
        assert_eq!(history_shortcut(true, false, keys(&[KeyCode::KeyZ])), Some(CanvasAction::Undo));
    }

    #[test]
    fn test_redo_shortcuts() {
        assert_eq!(history_shortcut(true, false, keys(&[KeyCode::KeyY])), Some(CanvasAction::Redo));
        assert_eq!(history_shortcut(true, true, keys(&[KeyCode::KeyZ])), Some(CanvasAction::Redo));
    }

    #[test]
    fn test_ctrl_backspace_clears() {
        assert_eq!(
            history_shortcut(true, false, keys(&[KeyCode::Backspace])),
            Some(CanvasAction::Clear)
        );
    }

    #[test]
    fn test_history_shortcuts_need_ctrl() {
        assert_eq!(history_shortcut(false, false, keys(&[KeyCode::KeyZ])), None);
        assert_eq!(history_shortcut(false, true, keys(&[KeyCode::KeyY])), None);
    }

    #[test]
    fn test_tool_shortcuts() {
        assert_eq!(tool_shortcut(keys(&[KeyCode::KeyP])), Some(DrawingTool::Pen));
        assert_eq!(tool_shortcut(keys(&[KeyCode::KeyM])), Some(DrawingTool::Marker));
        assert_eq!(tool_shortcut(keys(&[KeyCode::KeyH])), Some(DrawingTool::Highlighter));
        assert_eq!(tool_shortcut(keys(&[KeyCode::KeyE])), Some(DrawingTool::Eraser));
        assert_eq!(tool_shortcut(keys(&[KeyCode::KeyQ])), None);
    }
}
