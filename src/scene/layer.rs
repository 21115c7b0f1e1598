use serde::{Deserialize, Serialize};

use crate::assets::color::LayerColor;
use crate::foundation::error::{TbiError, TbiResult};

/// Rendered font size is the layer's `font_size` times this factor.
pub const FONT_SIZE_MULTIPLIER: f64 = 3.0;

/// Identifier of a text layer, unique within an editor state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub u32);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One text overlay drawn between the background photo and the subject cutout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextLayer {
    /// Unique within the owning state.
    pub id: LayerId,
    /// Content drawn for this layer.
    pub text: String,
    /// Requested family; falls back to sans-serif when not installed.
    pub font_family: String,
    /// Pixels, before [`FONT_SIZE_MULTIPLIER`].
    pub font_size: f64,
    /// CSS-style weight (100..=900) used to pick the face.
    pub font_weight: u16,
    /// Fill colour.
    pub color: LayerColor,
    /// 0..=1.
    pub opacity: f64,
    /// Percent offset from the centre; positive moves right.
    pub left: f64,
    /// Percent offset from the centre; positive moves up.
    pub top: f64,
    /// Degrees, in-plane.
    pub rotation: f64,
    /// Degrees around the X axis (vertical squash).
    pub tilt_x: f64,
    /// Degrees around the Y axis (horizontal squash).
    pub tilt_y: f64,
    /// Pixels added between characters.
    pub letter_spacing: f64,
    /// Carried for editing surfaces; the compositor does not draw shadows.
    pub shadow_color: LayerColor,
    /// Carried for editing surfaces; the compositor does not draw shadows.
    pub shadow_size: f64,
}

impl TextLayer {
    /// A layer with the editor's defaults.
    pub fn with_defaults(id: LayerId) -> Self {
        Self {
            id,
            text: "edit".to_owned(),
            font_family: "Inter".to_owned(),
            font_size: 200.0,
            font_weight: 800,
            color: LayerColor::white(),
            opacity: 1.0,
            left: 0.0,
            top: 0.0,
            rotation: 0.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
            letter_spacing: 0.0,
            shadow_color: LayerColor::default_shadow(),
            shadow_size: 4.0,
        }
    }

    /// Font size actually used when rasterizing.
    pub fn render_font_size(&self) -> f64 {
        self.font_size * FONT_SIZE_MULTIPLIER
    }

    /// Replace the field named by `attr`.
    pub fn apply(&mut self, attr: LayerAttr) {
        match attr {
            LayerAttr::Text(v) => self.text = v,
            LayerAttr::FontFamily(v) => self.font_family = v,
            LayerAttr::FontSize(v) => self.font_size = v,
            LayerAttr::FontWeight(v) => self.font_weight = v,
            LayerAttr::Color(v) => self.color = v,
            LayerAttr::Opacity(v) => self.opacity = v,
            LayerAttr::Left(v) => self.left = v,
            LayerAttr::Top(v) => self.top = v,
            LayerAttr::Rotation(v) => self.rotation = v,
            LayerAttr::TiltX(v) => self.tilt_x = v,
            LayerAttr::TiltY(v) => self.tilt_y = v,
            LayerAttr::LetterSpacing(v) => self.letter_spacing = v,
            LayerAttr::ShadowColor(v) => self.shadow_color = v,
            LayerAttr::ShadowSize(v) => self.shadow_size = v,
        }
    }

    /// Read the current value of the field `key` names, as it would be written back.
    pub fn get(&self, key: &str) -> TbiResult<serde_json::Value> {
        if key == "id" {
            return Ok(serde_json::Value::from(self.id.0));
        }
        let v = serde_json::to_value(self)?;
        v.get(key).cloned().ok_or_else(|| unknown_key(key))
    }
}

/// A single typed field edit.
///
/// Serialized as `{"key": "<camelCase field>", "value": ...}`; `id` is not editable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum LayerAttr {
    Text(String),
    FontFamily(String),
    FontSize(f64),
    FontWeight(u16),
    Color(LayerColor),
    Opacity(f64),
    Left(f64),
    Top(f64),
    Rotation(f64),
    TiltX(f64),
    TiltY(f64),
    LetterSpacing(f64),
    ShadowColor(LayerColor),
    ShadowSize(f64),
}

impl LayerAttr {
    /// Every editable key, in declaration order.
    pub const KEYS: [&'static str; 14] = [
        "text",
        "fontFamily",
        "fontSize",
        "fontWeight",
        "color",
        "opacity",
        "left",
        "top",
        "rotation",
        "tiltX",
        "tiltY",
        "letterSpacing",
        "shadowColor",
        "shadowSize",
    ];

    /// Build an edit from a string key and a loosely typed value.
    ///
    /// Unknown keys and values of the wrong type are rejected.
    pub fn parse(key: &str, value: serde_json::Value) -> TbiResult<Self> {
        if !Self::KEYS.contains(&key) {
            return Err(unknown_key(key));
        }
        serde_json::from_value(serde_json::json!({ "key": key, "value": value }))
            .map_err(|e| TbiError::validation(format!("invalid value for '{key}': {e}")))
    }

    /// Keys whose values are strings (text, family name, CSS colours).
    pub const STRING_KEYS: [&'static str; 4] = ["text", "fontFamily", "color", "shadowColor"];

    /// Build an edit from a command-line style value.
    ///
    /// String-typed keys take `raw` verbatim, so `2024` or `true` stay text. Other keys parse
    /// `raw` as JSON.
    pub fn from_cli_value(key: &str, raw: &str) -> TbiResult<Self> {
        if Self::STRING_KEYS.contains(&key) {
            return Self::parse(key, serde_json::Value::String(raw.to_owned()));
        }
        if !Self::KEYS.contains(&key) {
            return Err(unknown_key(key));
        }
        let value = serde_json::from_str(raw.trim())
            .map_err(|e| TbiError::validation(format!("invalid value for '{key}': {e}")))?;
        Self::parse(key, value)
    }

    /// The camelCase key this edit targets.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::FontFamily(_) => "fontFamily",
            Self::FontSize(_) => "fontSize",
            Self::FontWeight(_) => "fontWeight",
            Self::Color(_) => "color",
            Self::Opacity(_) => "opacity",
            Self::Left(_) => "left",
            Self::Top(_) => "top",
            Self::Rotation(_) => "rotation",
            Self::TiltX(_) => "tiltX",
            Self::TiltY(_) => "tiltY",
            Self::LetterSpacing(_) => "letterSpacing",
            Self::ShadowColor(_) => "shadowColor",
            Self::ShadowSize(_) => "shadowSize",
        }
    }
}

fn unknown_key(key: &str) -> TbiError {
    TbiError::validation(format!(
        "unknown text layer attribute '{key}' (expected one of: {})",
        LayerAttr::KEYS.join(", ")
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
