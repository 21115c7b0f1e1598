use crate::foundation::error::{TbiError, TbiResult};

pub use kurbo::{Affine, Point};

/// Largest side length the rasterizer accepts.
pub const MAX_CANVAS_SIDE: u32 = u16::MAX as u32;

/// Pixel dimensions of the output surface, always equal to the source image's natural size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Construct a canvas, rejecting empty or oversized surfaces.
    pub fn new(width: u32, height: u32) -> TbiResult<Self> {
        if width == 0 || height == 0 {
            return Err(TbiError::validation("canvas width/height must be > 0"));
        }
        if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            return Err(TbiError::validation(format!(
                "canvas {width}x{height} exceeds the {MAX_CANVAS_SIDE}px rasterizer limit"
            )));
        }
        Ok(Self { width, height })
    }

    pub(crate) fn size_u16(self) -> TbiResult<(u16, u16)> {
        let w = u16::try_from(self.width)
            .map_err(|_| TbiError::validation("canvas width exceeds u16"))?;
        let h = u16::try_from(self.height)
            .map_err(|_| TbiError::validation("canvas height exceeds u16"))?;
        Ok((w, h))
    }

    /// Map centre-relative percentage offsets to a top-left pixel anchor.
    ///
    /// Positive `top` moves the anchor upward.
    pub fn anchor_from_percent(self, left: f64, top: f64) -> Point {
        Point::new(
            f64::from(self.width) * (left + 50.0) / 100.0,
            f64::from(self.height) * (50.0 - top) / 100.0,
        )
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha colour.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

/// Degrees to radians.
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
