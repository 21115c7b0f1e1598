/// Convenience result type used across textbehind.
pub type TbiResult<T> = Result<T, TbiError>;

/// Top-level error taxonomy used by editor and compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum TbiError {
    /// Invalid user-provided data (attribute edits, project files, sizes).
    #[error("validation error: {0}")]
    Validation(String),

    /// Bytes that could not be decoded as a supported raster image.
    #[error("decode error: {0}")]
    Decode(String),

    /// The segmentation collaborator failed or returned an unusable cutout.
    #[error("segmentation error: {0}")]
    Segmentation(String),

    /// Errors raised while rasterizing or encoding the composite.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TbiError {
    /// Build a [`TbiError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TbiError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TbiError::Segmentation`] value.
    pub fn segmentation(msg: impl Into<String>) -> Self {
        Self::Segmentation(msg.into())
    }

    /// Build a [`TbiError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

impl From<serde_json::Error> for TbiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
