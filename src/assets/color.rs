use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{TbiError, TbiResult};

/// A fill colour written in any CSS colour syntax (`white`, `#ff3366`, `rgba(0, 0, 0, 0.8)`,
/// `hsl(...)`).
///
/// The source string is kept so project files round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerColor {
    css: String,
    rgba: [u8; 4],
}

impl LayerColor {
    /// Parse a CSS colour string.
    pub fn parse(css: &str) -> TbiResult<Self> {
        use vello_cpu::peniko::color::{Srgb, parse_color};

        let trimmed = css.trim();
        let parsed = parse_color(trimmed)
            .map_err(|e| TbiError::validation(format!("invalid colour \"{trimmed}\": {e}")))?;
        let c = parsed.to_alpha_color::<Srgb>().to_rgba8();
        Ok(Self {
            css: trimmed.to_owned(),
            rgba: [c.r, c.g, c.b, c.a],
        })
    }

    /// The colour as written.
    pub fn as_css(&self) -> &str {
        &self.css
    }

    /// Straight-alpha RGBA8.
    pub fn rgba8(&self) -> [u8; 4] {
        self.rgba
    }

    /// Premultiplied RGBA8.
    pub fn to_rgba8_premul(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.rgba;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    pub(crate) fn white() -> Self {
        Self {
            css: "white".to_owned(),
            rgba: [255, 255, 255, 255],
        }
    }

    pub(crate) fn default_shadow() -> Self {
        Self {
            css: "rgba(0, 0, 0, 0.8)".to_owned(),
            rgba: [0, 0, 0, 204],
        }
    }
}

impl std::str::FromStr for LayerColor {
    type Err = TbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LayerColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.css)
    }
}

impl<'de> Deserialize<'de> for LayerColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
