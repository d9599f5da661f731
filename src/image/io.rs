//! Reading parcels and tiles, encoding tiles, and saving the build summary.
use crate::error::TileError;
use image::{ImageError, ImageFormat, ImageReader, RgbaImage};
use serde::Serialize;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Load an image from disk and convert it to 8-bit RGBA.
pub fn load_rgba_image(path: &Path) -> Result<RgbaImage, TileError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| TileError::source_read(path, ImageError::IoError(e)))?;
    let img = reader
        .decode()
        .map_err(|e| TileError::source_read(path, e))?;
    Ok(img.into_rgba8())
}

/// Encode to PNG. Output is a pure function of the pixels.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Save a build summary (or any report) as indented JSON. Missing parent
/// directories are created.
pub fn save_json<T: Serialize>(path: &Path, report: &T) -> Result<(), String> {
    let json = serde_json::to_vec_pretty(report)
        .map_err(|e| format!("cannot encode {} as JSON: {e}", path.display()))?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;
    }
    fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))
}
