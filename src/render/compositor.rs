use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use usvg::fontdb;

use crate::assets::fonts::{FontBook, ResolvedFace};
use crate::assets::raster::RasterImage;
use crate::foundation::core::{Affine, Canvas, deg_to_rad};
use crate::foundation::error::{TbiError, TbiResult};
use crate::render::frame::{FrameRGBA, export_png};
use crate::scene::layer::TextLayer;
use crate::scene::state::EditorState;
use crate::text::layout::{TextBrushRgba8, TextLayoutEngine, plan_run};

/// Draws an [`EditorState`] into a single raster.
///
/// Paint order is fixed: the source photo at 1:1, then every text layer in z-order, then the
/// subject cutout (when ready) stretched over the whole canvas. Output is premultiplied RGBA8 at
/// the source's natural size.
pub struct Compositor {
    fonts: FontBook,
    text: TextLayoutEngine,
    face_cache: HashMap<fontdb::ID, ResolvedFace>,
    font_cache: HashMap<fontdb::ID, vello_cpu::peniko::FontData>,
}

impl Compositor {
    /// Compositor that resolves layer fonts from `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            text: TextLayoutEngine::new(),
            face_cache: HashMap::new(),
            font_cache: HashMap::new(),
        }
    }

    /// Font database used for layer lookups.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Render `state`. Returns `None` when no image is loaded.
    #[tracing::instrument(skip(self, state), fields(layers = state.layers().len()))]
    pub fn render(&mut self, state: &EditorState) -> TbiResult<Option<FrameRGBA>> {
        let Some(source) = state.source() else {
            return Ok(None);
        };
        let canvas = source.canvas()?;
        let (w, h) = canvas.size_u16()?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        draw_image(&mut ctx, source, Affine::IDENTITY)?;

        for layer in state.renderable_layers() {
            self.draw_layer(&mut ctx, canvas, layer)?;
        }

        if let Some(cutout) = state.cutout() {
            let sx = f64::from(canvas.width) / f64::from(cutout.width());
            let sy = f64::from(canvas.height) / f64::from(cutout.height());
            draw_image(&mut ctx, cutout, Affine::scale_non_uniform(sx, sy))?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(Some(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }))
    }

    /// Render `state` and write it as PNG to `dest`. Does nothing without an image.
    pub fn export(&mut self, state: &EditorState, dest: &Path) -> TbiResult<Option<PathBuf>> {
        match self.render(state)? {
            Some(frame) => export_png(&frame, dest).map(Some),
            None => {
                tracing::info!("nothing to export: no image loaded");
                Ok(None)
            }
        }
    }

    fn draw_layer(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        canvas: Canvas,
        layer: &TextLayer,
    ) -> TbiResult<()> {
        let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
        let size_px = layer.render_font_size() as f32;
        if layer.text.is_empty() || opacity <= 0.0 {
            return Ok(());
        }
        if !size_px.is_finite() || size_px <= 0.0 {
            tracing::warn!(layer = %layer.id, font_size = layer.font_size, "skipping layer with unusable font size");
            return Ok(());
        }

        let Some(face) = self.face_for(&layer.font_family, layer.font_weight) else {
            tracing::warn!(layer = %layer.id, family = %layer.font_family, "no font face available; layer not drawn");
            return Ok(());
        };
        let font = self.font_data(&face);

        let [r, g, b, a] = layer.color.rgba8();
        let brush = TextBrushRgba8 { r, g, b, a };

        let engine = &mut self.text;
        let plan = plan_run(&layer.text, layer.letter_spacing, |piece| {
            engine.measure(piece, &face, size_px)
        })?;

        let base = layer_transform(canvas, layer);

        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        for piece in &plan.pieces {
            let layout = self.text.layout_line(&piece.text, &face, size_px, brush)?;
            let origin = Affine::translate((piece.left, -f64::from(layout.height()) / 2.0));
            ctx.set_transform(affine_to_cpu(base * origin));
            draw_layout(ctx, &font, &layout);
        }
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn face_for(&mut self, family: &str, weight: u16) -> Option<ResolvedFace> {
        let id = self.fonts.query(family, weight)?;
        if let Some(face) = self.face_cache.get(&id) {
            return Some(face.clone());
        }
        let face = self.fonts.load_face(id, family)?;
        self.face_cache.insert(id, face.clone());
        Some(face)
    }

    fn font_data(&mut self, face: &ResolvedFace) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry(face.id)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
                    face.index,
                )
            })
            .clone()
    }
}

/// Placement of a layer's local origin on the canvas.
///
/// Translate to the percentage anchor, squash each axis by the cosine of the opposite tilt, then
/// rotate in-plane.
pub fn layer_transform(canvas: Canvas, layer: &TextLayer) -> Affine {
    let anchor = canvas.anchor_from_percent(layer.left, layer.top);
    let tilt = Affine::new([
        deg_to_rad(-layer.tilt_y).cos(),
        0.0,
        0.0,
        deg_to_rad(-layer.tilt_x).cos(),
        0.0,
        0.0,
    ]);
    Affine::translate(anchor.to_vec2()) * tilt * Affine::rotate(deg_to_rad(layer.rotation))
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<TextBrushRgba8>,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                continue;
            };

            let mut x = glyph_run.offset();
            let y = glyph_run.baseline();
            let font_size = glyph_run.run().font_size();
            let glyphs = glyph_run.glyphs().map(|g| {
                let gx = x + g.x;
                let gy = y - g.y;
                x += g.advance;
                vello_cpu::Glyph {
                    id: g.id,
                    x: gx,
                    y: gy,
                }
            });
            ctx.glyph_run(font).font_size(font_size).fill_glyphs(glyphs);
        }
    }
}

fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    image: &RasterImage,
    transform: Affine,
) -> TbiResult<()> {
    let pixmap = pixmap_from_raster(image)?;
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(image.width()),
        f64::from(image.height()),
    ));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

fn pixmap_from_raster(image: &RasterImage) -> TbiResult<vello_cpu::Pixmap> {
    let (w, h) = image.canvas()?.size_u16()?;
    let bytes = image.premul_bytes();
    if bytes.len() != image.width() as usize * image.height() as usize * 4 {
        return Err(TbiError::render("raster byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
