use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{TbiError, TbiResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// File name used for the exported composite.
pub const EXPORT_FILE_NAME: &str = "text-behind-image.png";

/// Encode premultiplied RGBA8 pixels as a PNG with straight alpha.
pub fn encode_png_premul(width: u32, height: u32, rgba8_premul: &[u8]) -> TbiResult<Vec<u8>> {
    let mut straight = rgba8_premul.to_vec();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(width, height, straight).ok_or_else(|| {
        TbiError::render(format!("pixel buffer does not fit {width}x{height} rgba8"))
    })?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| TbiError::render(format!("encode png: {e}")))?;
    Ok(buf)
}

/// Where an export lands: inside `dest` when it is a directory, else `dest` itself.
pub fn export_path(dest: &Path) -> PathBuf {
    let looks_like_dir = dest.is_dir()
        || dest.as_os_str().is_empty()
        || dest
            .to_str()
            .is_some_and(|s| s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR));
    if looks_like_dir {
        dest.join(EXPORT_FILE_NAME)
    } else {
        dest.to_path_buf()
    }
}

/// Write PNG bytes to the export location for `dest`, returning the final path.
pub fn write_export(dest: &Path, png: &[u8]) -> TbiResult<PathBuf> {
    let path = export_path(dest);
    ensure_parent_dir(&path)?;
    std::fs::write(&path, png).with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(path = %path.display(), bytes = png.len(), "exported composite");
    Ok(path)
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> TbiResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
