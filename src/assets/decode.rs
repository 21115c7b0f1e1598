use std::path::Path;

use anyhow::Context;

use crate::assets::raster::RasterImage;
use crate::foundation::error::{TbiError, TbiResult};

/// File extensions accepted by the upload surface.
pub const SUPPORTED_UPLOAD_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Extension filter applied before any bytes are read (case-insensitive).
pub fn is_supported_upload(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_UPLOAD_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Decode uploaded bytes into a raster, reading its natural dimensions.
///
/// Only PNG and JPEG content is accepted, independent of the file name.
pub fn decode_image(bytes: &[u8]) -> TbiResult<RasterImage> {
    let format = image::guess_format(bytes)
        .map_err(|e| TbiError::decode(format!("unrecognized image data: {e}")))?;
    if !matches!(format, image::ImageFormat::Png | image::ImageFormat::Jpeg) {
        return Err(TbiError::decode(format!(
            "unsupported image format {format:?} (expected png or jpeg)"
        )));
    }
    let dyn_img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| TbiError::decode(format!("decode {format:?}: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(TbiError::decode("image has zero width or height"));
    }
    RasterImage::from_rgba_image(rgba)
}

/// Read and decode an image file, applying the upload extension filter first.
pub fn load_image_file(path: &Path) -> TbiResult<RasterImage> {
    if !is_supported_upload(path) {
        return Err(TbiError::decode(format!(
            "'{}' is not a .jpg, .jpeg or .png file",
            path.display()
        )));
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
