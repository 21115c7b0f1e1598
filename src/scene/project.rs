use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TbiError, TbiResult};
use crate::scene::layer::TextLayer;
use crate::scene::state::EditorState;

/// JSON document persisting an editing session between CLI invocations.
///
/// Paths are relative to the project file unless absolute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Background photo (`.jpg`, `.jpeg` or `.png`).
    pub image: PathBuf,
    /// Ready-made cutout to use instead of running segmentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutout: Option<PathBuf>,
    /// Greyscale matte applied to the photo to form the cutout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<PathBuf>,
    /// Text layers in z-order.
    #[serde(default)]
    pub layers: Vec<TextLayer>,
}

impl Project {
    /// Project for `image` with no layers.
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            cutout: None,
            mask: None,
            layers: Vec::new(),
        }
    }

    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TbiResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| TbiError::validation(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TbiResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TbiError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write the project as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> TbiResult<()> {
        let path = path.as_ref();
        crate::encode::png::ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            TbiError::validation(format!("write project JSON '{}': {e}", path.display()))
        })
    }

    /// Resolve a project-relative path against the directory holding the project file.
    pub fn resolve(project_path: &Path, rel: &Path) -> PathBuf {
        if rel.is_absolute() {
            return rel.to_path_buf();
        }
        project_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(rel)
    }

    /// Editor state holding this project's layers (no image yet).
    pub fn to_state(&self) -> TbiResult<EditorState> {
        EditorState::new().with_layers(self.layers.clone())
    }

    /// Copy the layers of `state` back into the project.
    pub fn with_state_layers(mut self, state: &EditorState) -> Self {
        self.layers = state.layers().to_vec();
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/project.rs"]
mod tests;
