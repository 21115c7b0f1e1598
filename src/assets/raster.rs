use std::sync::Arc;

use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{TbiError, TbiResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster in premultiplied RGBA8 form.
///
/// Pixel storage is shared, so cloning a `RasterImage` (and therefore an editor state that holds
/// one) does not copy pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl RasterImage {
    /// Build from premultiplied RGBA8 bytes.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> TbiResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(TbiError::validation(format!(
                "raster byte len {} does not match {width}x{height} rgba8",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Build from straight-alpha RGBA8 bytes.
    pub fn from_straight(width: u32, height: u32, mut rgba8: Vec<u8>) -> TbiResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul(width, height, rgba8)
    }

    /// Build from an `image` crate RGBA buffer (straight alpha).
    pub fn from_rgba_image(img: image::RgbaImage) -> TbiResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_straight(width, height, img.into_raw())
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Output canvas matching this image's natural size.
    pub fn canvas(&self) -> TbiResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn premul_bytes(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = &self.rgba8_premul[idx..idx + 4];
        Some(Rgba8Premul {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }
}
