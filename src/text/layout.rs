use std::collections::HashMap;

use crate::assets::fonts::ResolvedFace;
use crate::foundation::error::{TbiError, TbiResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush colour carried through Parley layouts.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// One horizontally placed piece of a text run, in layer-local pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct RunPiece {
    /// The text drawn by this piece (the whole string, or one character).
    pub text: String,
    /// Left edge relative to the layer origin.
    pub left: f64,
    /// Measured advance width.
    pub width: f64,
}

impl RunPiece {
    /// Horizontal centre relative to the layer origin.
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Horizontal layout of one text layer, centred on the layer origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunPlan {
    /// Width used for centring.
    pub total_width: f64,
    /// Pieces in drawing order.
    pub pieces: Vec<RunPiece>,
}

/// Lay out `text` centred on x = 0.
///
/// With zero letter spacing the whole string is one piece. Otherwise each character is measured
/// on its own, the run width is `sum(widths) + (n - 1) * spacing`, and characters are placed left
/// to right from `-total / 2`, advancing by `width + spacing`.
pub fn plan_run<F>(text: &str, letter_spacing: f64, mut measure: F) -> TbiResult<RunPlan>
where
    F: FnMut(&str) -> TbiResult<f64>,
{
    if text.is_empty() {
        return Ok(RunPlan::default());
    }

    if letter_spacing == 0.0 {
        let width = measure(text)?;
        return Ok(RunPlan {
            total_width: width,
            pieces: vec![RunPiece {
                text: text.to_owned(),
                left: -width / 2.0,
                width,
            }],
        });
    }

    let mut measured = Vec::<(String, f64)>::new();
    for ch in text.chars() {
        let s = ch.to_string();
        let w = measure(&s)?;
        measured.push((s, w));
    }

    let gaps = measured.len().saturating_sub(1) as f64;
    let total_width = measured.iter().map(|(_, w)| *w).sum::<f64>() + gaps * letter_spacing;

    let mut cursor = -total_width / 2.0;
    let mut pieces = Vec::with_capacity(measured.len());
    for (text, width) in measured {
        pieces.push(RunPiece {
            text,
            left: cursor,
            width,
        });
        cursor += width + letter_spacing;
    }

    Ok(RunPlan {
        total_width,
        pieces,
    })
}

/// Stateful helper for building Parley layouts from resolved font faces.
///
/// Each face's bytes are registered with Parley once and then addressed by family name.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<usvg::fontdb::ID, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn family_for(&mut self, face: &ResolvedFace) -> TbiResult<String> {
        if let Some(name) = self.registered.get(&face.id) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        // A collection file registers every face; shape with the family holding this face.
        let family_id = families
            .iter()
            .find(|(_, infos)| infos.iter().any(|info| info.index() == face.index))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| TbiError::render("no font families registered from font bytes"))?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TbiError::render("registered font family has no name"))?
            .to_string();

        self.registered.insert(face.id, family_name.clone());
        Ok(family_name)
    }

    /// Shape `text` as a single unbroken line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        face: &ResolvedFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> TbiResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TbiError::validation(
                "text size must be finite and > 0",
            ));
        }

        let family_name = self.family_for(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::FontWeight::new(f32::from(face.weight)),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Advance width of `text` including trailing whitespace.
    pub(crate) fn measure(
        &mut self,
        text: &str,
        face: &ResolvedFace,
        size_px: f32,
    ) -> TbiResult<f64> {
        let layout = self.layout_line(text, face, size_px, TextBrushRgba8::default())?;
        Ok(f64::from(layout.full_width()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
