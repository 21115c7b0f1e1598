use std::path::{Path, PathBuf};

use crate::assets::decode::load_image_file;
use crate::assets::raster::RasterImage;
use crate::foundation::error::{TbiError, TbiResult};
use crate::foundation::math::mul_div255_u8;

/// The subject-segmentation collaborator.
///
/// Given the source photo, returns a cutout of the same size whose background pixels are
/// transparent. Implementations run on a worker thread, so they must be `Send + Sync`.
pub trait Segmenter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Produce the subject cutout for `image`.
    fn segment(&self, image: &RasterImage) -> TbiResult<RasterImage>;
}

impl<F> Segmenter for F
where
    F: Fn(&RasterImage) -> TbiResult<RasterImage> + Send + Sync,
{
    fn segment(&self, image: &RasterImage) -> TbiResult<RasterImage> {
        self(image)
    }
}

/// Segmenter that never produces a cutout; text stays visible over the whole photo.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSegmentation;

impl Segmenter for NoSegmentation {
    fn name(&self) -> &str {
        "none"
    }

    fn segment(&self, _image: &RasterImage) -> TbiResult<RasterImage> {
        Err(TbiError::segmentation("segmentation disabled"))
    }
}

/// Cutout produced ahead of time by another tool and stored as a PNG.
#[derive(Clone, Debug)]
pub struct PrecomputedCutout {
    path: PathBuf,
}

impl PrecomputedCutout {
    /// Use the cutout stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Segmenter for PrecomputedCutout {
    fn name(&self) -> &str {
        "precomputed"
    }

    fn segment(&self, image: &RasterImage) -> TbiResult<RasterImage> {
        let cutout = load_image_file(&self.path)
            .map_err(|e| TbiError::segmentation(format!("load cutout: {e}")))?;
        ensure_same_size(image, &cutout)?;
        Ok(cutout)
    }
}

/// Cuts the subject out with a greyscale matte: white keeps a pixel, black removes it.
#[derive(Clone, Debug)]
pub struct MaskSegmenter {
    path: PathBuf,
}

impl MaskSegmenter {
    /// Use the matte stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Segmenter for MaskSegmenter {
    fn name(&self) -> &str {
        "mask"
    }

    fn segment(&self, image: &RasterImage) -> TbiResult<RasterImage> {
        let matte = load_matte(&self.path)?;
        apply_matte(image, &matte)
    }
}

fn load_matte(path: &Path) -> TbiResult<image::GrayImage> {
    let img = image::open(path).map_err(|e| {
        TbiError::segmentation(format!("load matte '{}': {e}", path.display()))
    })?;
    Ok(img.to_luma8())
}

/// Scale every premultiplied pixel of `image` by the matte's luminance.
pub(crate) fn apply_matte(image: &RasterImage, matte: &image::GrayImage) -> TbiResult<RasterImage> {
    if matte.dimensions() != image.dimensions() {
        let (mw, mh) = matte.dimensions();
        let (w, h) = image.dimensions();
        return Err(TbiError::segmentation(format!(
            "matte is {mw}x{mh} but image is {w}x{h}"
        )));
    }
    let mut out = image.premul_bytes().to_vec();
    for (px, m) in out.chunks_exact_mut(4).zip(matte.as_raw()) {
        let m = u16::from(*m);
        for c in px.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), m);
        }
    }
    RasterImage::from_premul(image.width(), image.height(), out)
}

pub(crate) fn ensure_same_size(source: &RasterImage, cutout: &RasterImage) -> TbiResult<()> {
    if source.dimensions() != cutout.dimensions() {
        let (cw, ch) = cutout.dimensions();
        let (w, h) = source.dimensions();
        return Err(TbiError::segmentation(format!(
            "cutout is {cw}x{ch} but image is {w}x{h}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/segment/segmenter.rs"]
mod tests;
