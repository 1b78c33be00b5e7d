use bevy::prelude::*;
use std::path::PathBuf;

#[derive(Message)]
pub struct SaveDrawingRequest {
    pub path: PathBuf,
}

#[derive(Message)]
pub struct LoadDrawingRequest {
    pub path: PathBuf,
}

/// Write the current canvas as a PNG image
#[derive(Message)]
pub struct ExportPngRequest {
    pub path: PathBuf,
}
