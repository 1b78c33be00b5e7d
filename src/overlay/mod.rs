//! Step markers drawn over the canvas.

mod markers;
mod rendering;
mod state;

pub use markers::MarkerKind;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::session::SessionUpdate;

use state::OverlayState;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverlayState>()
            .add_systems(
                Update,
                (
                    rendering::reset_on_question_change,
                    rendering::reveal_on_check_resolved,
                )
                    .chain()
                    .after(SessionUpdate),
            )
            .add_systems(EguiPrimaryContextPass, rendering::overlay_ui);
    }
}
