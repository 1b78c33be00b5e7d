//! Drawing load system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::canvas::{DrawingChanged, DrawingSurface};
use crate::config::UpdateLastDrawingRequest;
use crate::session::LoadQuestionRequest;

use super::messages::LoadDrawingRequest;
use super::resources::{
    file_label, AsyncDrawingOperation, CurrentDrawingFile, DrawingIoError, LoadDrawingTask,
    LoadResult,
};
use super::saved_drawing::SavedDrawing;

pub fn load_drawing_system(
    mut commands: Commands,
    mut events: MessageReader<LoadDrawingRequest>,
    mut async_op: ResMut<AsyncDrawingOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Drawing operation already in progress");
            continue;
        }

        let path = event.path.clone();
        async_op.is_loading = true;
        async_op.operation_description = Some(format!("Loading {}...", file_label(&path, "drawing")));

        let task = IoTaskPool::get().spawn(async move {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read file: {}", e))
                .and_then(|json| SavedDrawing::from_json(&json));
            match parsed {
                Ok(drawing) => LoadResult {
                    path,
                    drawing: Some(drawing),
                    error: None,
                },
                Err(error) => LoadResult {
                    path,
                    drawing: None,
                    error: Some(error),
                },
            }
        });

        commands.spawn(LoadDrawingTask(task));
    }
}

/// Replaces the committed history with the loaded strokes
#[allow(clippy::too_many_arguments)]
pub fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadDrawingTask)>,
    mut async_op: ResMut<AsyncDrawingOperation>,
    mut surface: ResMut<DrawingSurface>,
    mut current_file: ResMut<CurrentDrawingFile>,
    mut io_error: ResMut<DrawingIoError>,
    mut changed: MessageWriter<DrawingChanged>,
    mut config_events: MessageWriter<UpdateLastDrawingRequest>,
    mut question_events: MessageWriter<LoadQuestionRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            async_op.finish();
            commands.entity(entity).despawn();

            let Some(drawing) = result.drawing else {
                if let Some(error) = result.error {
                    error!("{}", error);
                    io_error.message = Some(error);
                }
                continue;
            };
            io_error.message = None;

            if (drawing.width, drawing.height) != (surface.width(), surface.height()) {
                debug!(
                    "Drawing was saved at {}x{}, canvas is {}x{}",
                    drawing.width,
                    drawing.height,
                    surface.width(),
                    surface.height()
                );
            }
            let question_id = drawing.question_id.clone();
            let (strokes, skipped) = drawing.into_valid_strokes();
            if skipped > 0 {
                warn!("Skipped {} malformed stroke(s) in {:?}", skipped, result.path);
            }

            info!("Loaded {} stroke(s) from {:?}", strokes.len(), result.path);
            let snapshot = surface.restore(strokes);
            changed.write(DrawingChanged { snapshot });

            if let Some(id) = question_id {
                question_events.write(LoadQuestionRequest { id });
            }
            current_file.path = Some(result.path.clone());
            config_events.write(UpdateLastDrawingRequest { path: result.path });
        }
    }
}
