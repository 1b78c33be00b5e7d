//! PNG export of the canvas raster.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::canvas::DrawingSurface;

use super::messages::ExportPngRequest;
use super::resources::{file_label, AsyncDrawingOperation, DrawingIoError, ExportPngTask, WriteResult};

/// The raster is transparent where nothing is drawn; exports sit on white paper
pub fn flatten_on_white(raster: &RgbaImage) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(raster.width(), raster.height(), Rgba([255, 255, 255, 255]));
    for (dst, src) in out.pixels_mut().zip(raster.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            let blended = (src[c] as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            dst[c] = blended as u8;
        }
    }
    out
}

pub fn export_png_system(
    mut commands: Commands,
    mut events: MessageReader<ExportPngRequest>,
    surface: Res<DrawingSurface>,
    mut async_op: ResMut<AsyncDrawingOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Drawing operation already in progress");
            continue;
        }

        let image = flatten_on_white(surface.raster());
        let path = event.path.clone();
        async_op.is_exporting = true;
        async_op.operation_description = Some(format!("Exporting {}...", file_label(&path, "image")));

        let task = IoTaskPool::get().spawn(async move {
            match image.save_with_format(&path, ImageFormat::Png) {
                Ok(()) => WriteResult {
                    path,
                    success: true,
                    error: None,
                },
                Err(e) => WriteResult {
                    path,
                    success: false,
                    error: Some(format!("Failed to export image: {}", e)),
                },
            }
        });

        commands.spawn(ExportPngTask(task));
    }
}

pub fn poll_export_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ExportPngTask)>,
    mut async_op: ResMut<AsyncDrawingOperation>,
    mut io_error: ResMut<DrawingIoError>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            async_op.finish();

            if result.success {
                info!("Canvas exported to {:?}", result.path);
                io_error.message = None;
            } else if let Some(error) = result.error {
                error!("{}", error);
                io_error.message = Some(error);
            }

            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_becomes_white() {
        let raster = RgbaImage::new(2, 2);
        let flat = flatten_on_white(&raster);
        assert!(flat.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_opaque_ink_is_kept() {
        let mut raster = RgbaImage::new(1, 1);
        raster.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        assert_eq!(*flatten_on_white(&raster).get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_translucent_ink_blends_with_paper() {
        let mut raster = RgbaImage::new(1, 1);
        raster.put_pixel(0, 0, Rgba([0, 0, 0, 128]));
        let pixel = *flatten_on_white(&raster).get_pixel(0, 0);
        assert_eq!(pixel[0], 127);
        assert_eq!(pixel[3], 255);
    }
}
