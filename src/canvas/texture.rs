//! The canvas raster shown as a full-window sprite.
//!
//! Canvas coordinates are window logical pixels with a top-left origin, which
//! is exactly what `Window::cursor_position` reports. The sprite is centered
//! under a default `Camera2d` and sized to the window, so image row 0 is the
//! top edge of the window.

use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::PrimaryWindow;
use image::RgbaImage;

use super::surface::DrawingSurface;
use crate::config::AppConfig;
use crate::constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

/// Handle of the texture the surface raster is uploaded into
#[derive(Resource)]
pub struct CanvasTexture {
    pub handle: Handle<Image>,
}

#[derive(Component)]
pub struct CanvasSprite;

/// Wrap a raster in a Bevy image
pub fn create_canvas_image(raster: &RgbaImage) -> Image {
    Image::new(
        Extent3d {
            width: raster.width(),
            height: raster.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        raster.as_raw().clone(),
        TextureFormat::Rgba8UnormSrgb,
        default(),
    )
}

/// Startup system: create the surface from the window size and the saved brush defaults
pub fn setup_canvas(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    config: Res<AppConfig>,
) {
    let (width, height) = window_query
        .single()
        .map(|window| (window.width(), window.height()))
        .unwrap_or((DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT));

    let mut surface = DrawingSurface::new(width.round() as u32, height.round() as u32);
    surface.set_brush(config.data.brush());

    let handle = images.add(create_canvas_image(surface.raster()));
    commands.spawn(Camera2d);
    commands.spawn((
        Sprite {
            image: handle.clone(),
            custom_size: Some(Vec2::new(surface.width() as f32, surface.height() as f32)),
            ..default()
        },
        CanvasSprite,
    ));

    info!("Canvas created at {}x{}", surface.width(), surface.height());
    commands.insert_resource(CanvasTexture { handle });
    commands.insert_resource(surface);
}

/// Upload the raster when it changed, reallocating the texture after a resize
pub fn sync_canvas_texture(
    mut surface: ResMut<DrawingSurface>,
    texture: Res<CanvasTexture>,
    mut images: ResMut<Assets<Image>>,
    mut sprite_query: Query<&mut Sprite, With<CanvasSprite>>,
) {
    if !surface.take_needs_upload() {
        return;
    }

    let raster = surface.raster();
    let Some(mut image) = images.get_mut(&texture.handle) else {
        warn!("Canvas texture missing, skipping upload");
        return;
    };

    let size = image.size();
    if size.x != raster.width() || size.y != raster.height() {
        *image = create_canvas_image(raster);
    } else {
        image.data = Some(raster.as_raw().clone());
    }

    let logical_size = Vec2::new(raster.width() as f32, raster.height() as f32);
    for mut sprite in sprite_query.iter_mut() {
        sprite.custom_size = Some(logical_size);
    }
}
