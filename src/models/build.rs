//! Image build parameters

use crate::models::ResolvedPartition;
use serde::Serialize;
use std::path::PathBuf;

/// Everything the image builder needs, fixed once per invocation
#[derive(Debug, Clone, Serialize)]
pub struct BuildConfig {
    /// Folder whose contents are packed into the image
    pub data_dir: PathBuf,
    /// Region the image must fit; `size` is the image size
    pub partition: ResolvedPartition,
    pub page_size: u32,
    pub block_size: u32,
    /// Pass `-p`/`-b` to the builder as well
    pub pass_geometry: bool,
    /// `<buildDir>/<sketchName>.fatfs.bin`
    pub image_path: PathBuf,
}

impl BuildConfig {
    /// Name of the produced image file for a sketch
    pub fn image_file_name(sketch_name: &str) -> String {
        format!("{}.fatfs.bin", sketch_name)
    }
}
