//! Drawing save system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::canvas::DrawingSurface;
use crate::config::UpdateLastDrawingRequest;
use crate::session::SessionCoordinator;

use super::messages::SaveDrawingRequest;
use super::resources::{
    file_label, AsyncDrawingOperation, CurrentDrawingFile, DrawingIoError, SaveDrawingTask,
    WriteResult,
};
use super::saved_drawing::SavedDrawing;

pub fn save_drawing_system(
    mut commands: Commands,
    mut events: MessageReader<SaveDrawingRequest>,
    surface: Res<DrawingSurface>,
    coordinator: Res<SessionCoordinator>,
    mut async_op: ResMut<AsyncDrawingOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Drawing operation already in progress");
            continue;
        }

        let saved = SavedDrawing::new(
            surface.committed().to_vec(),
            surface.width(),
            surface.height(),
            coordinator.question().map(|q| q.id.clone()),
        );
        let path = event.path.clone();

        async_op.is_saving = true;
        async_op.operation_description = Some(format!("Saving {}...", file_label(&path, "drawing")));

        let task = IoTaskPool::get().spawn(async move {
            let result = saved.to_json().and_then(|json| {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| format!("Failed to create folder: {}", e))?;
                }
                std::fs::write(&path, json).map_err(|e| format!("Failed to write file: {}", e))
            });
            match result {
                Ok(()) => WriteResult {
                    path,
                    success: true,
                    error: None,
                },
                Err(error) => WriteResult {
                    path,
                    success: false,
                    error: Some(error),
                },
            }
        });

        commands.spawn(SaveDrawingTask(task));
    }
}

pub fn poll_save_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SaveDrawingTask)>,
    mut async_op: ResMut<AsyncDrawingOperation>,
    mut current_file: ResMut<CurrentDrawingFile>,
    mut io_error: ResMut<DrawingIoError>,
    mut config_events: MessageWriter<UpdateLastDrawingRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            async_op.finish();

            if result.success {
                info!("Drawing saved to {:?}", result.path);
                io_error.message = None;
                current_file.path = Some(result.path.clone());
                config_events.write(UpdateLastDrawingRequest { path: result.path });
            } else if let Some(error) = result.error {
                error!("{}", error);
                io_error.message = Some(error);
            }

            commands.entity(entity).despawn();
        }
    }
}
