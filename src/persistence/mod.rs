//! Drawing files: save and load committed strokes as JSON, export the canvas as PNG.
//!
//! All file I/O runs on the IO task pool. Only one operation runs at a time;
//! requests made while one is in flight are dropped with a warning.

mod export;
mod load;
mod messages;
mod resources;
mod save;
mod saved_drawing;

pub use messages::{ExportPngRequest, LoadDrawingRequest, SaveDrawingRequest};
pub use resources::{AsyncDrawingOperation, CurrentDrawingFile, DrawingIoError};

use bevy::prelude::*;

use crate::canvas::CanvasInput;
use crate::session::SessionUpdate;

pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AsyncDrawingOperation>()
            .init_resource::<DrawingIoError>()
            .init_resource::<CurrentDrawingFile>()
            .add_message::<SaveDrawingRequest>()
            .add_message::<LoadDrawingRequest>()
            .add_message::<ExportPngRequest>()
            .add_systems(
                Update,
                (
                    save::save_drawing_system,
                    save::poll_save_tasks,
                    load::load_drawing_system,
                    load::poll_load_tasks,
                    export::export_png_system,
                    export::poll_export_tasks,
                )
                    .chain()
                    .after(CanvasInput)
                    .before(SessionUpdate),
            );
    }
}
