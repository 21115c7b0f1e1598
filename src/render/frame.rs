use std::path::{Path, PathBuf};

use crate::encode::png::{encode_png_premul, write_export};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::TbiResult;

/// A rendered composite: tightly packed RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
    /// Whether `data` is alpha-premultiplied.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied value of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some(if self.premultiplied {
            Rgba8Premul {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        } else {
            Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], px[3])
        })
    }

    /// Encode as PNG with straight alpha.
    pub fn to_png_bytes(&self) -> TbiResult<Vec<u8>> {
        if self.premultiplied {
            encode_png_premul(self.width, self.height, &self.data)
        } else {
            let mut premul = self.data.clone();
            crate::foundation::math::premultiply_rgba8_in_place(&mut premul);
            encode_png_premul(self.width, self.height, &premul)
        }
    }
}

/// Write `frame` as a PNG to `dest` (a file path, or a directory that receives
/// `text-behind-image.png`). Returns the written path.
pub fn export_png(frame: &FrameRGBA, dest: &Path) -> TbiResult<PathBuf> {
    let png = frame.to_png_bytes()?;
    write_export(dest, &png)
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
