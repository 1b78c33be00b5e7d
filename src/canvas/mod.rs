//! Freehand drawing canvas: stroke model, history, rasterizer and input.

mod history;
pub mod input;
pub mod raster;
mod snapshot;
mod stroke;
mod surface;
pub mod texture;
mod tools;

pub use input::{CanvasAction, DrawingChanged};
pub use snapshot::{BoundingBox, DrawingSnapshot, RecognizedRegion, SnapshotKey};
pub use stroke::{Rgb, Stroke};
pub use surface::{BrushSettings, DrawingSurface};
pub use tools::DrawingTool;

use bevy::prelude::*;

use crate::config::ConfigLoaded;

/// System set for everything that mutates the surface from input
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanvasInput;

pub struct CanvasPlugin;

impl Plugin for CanvasPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<CanvasAction>()
            .add_message::<DrawingChanged>()
            .add_systems(Startup, texture::setup_canvas.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    input::handle_window_resize,
                    input::handle_tool_shortcuts,
                    input::handle_history_shortcuts,
                    input::handle_mouse_drawing,
                    input::handle_touch_drawing,
                    input::apply_canvas_actions,
                )
                    .chain()
                    .in_set(CanvasInput),
            )
            .add_systems(Update, texture::sync_canvas_texture.after(CanvasInput));
    }
}
