use std::path::{Path, PathBuf};
use std::sync::Arc;

use usvg::fontdb;

/// Where to look for font faces.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontSources {
    /// Load the platform's installed fonts.
    pub load_system: bool,
    /// Extra directories scanned (non-recursively) for `.ttf`, `.otf` and `.ttc` files.
    pub dirs: Vec<PathBuf>,
}

impl FontSources {
    /// System fonts only.
    pub fn system() -> Self {
        Self {
            load_system: true,
            dirs: Vec::new(),
        }
    }
}

/// A concrete face picked for a family/weight request.
#[derive(Clone)]
pub struct ResolvedFace {
    pub(crate) id: fontdb::ID,
    /// Family name the face reports.
    pub family: String,
    /// Weight the face reports (100..=900).
    pub weight: u16,
    /// Raw font file bytes.
    pub data: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
}

impl std::fmt::Debug for ResolvedFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFace")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("data_len", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Font database keyed by family name and weight.
///
/// Lookups fall back to the generic sans-serif family and then to any face at all, mirroring how
/// a browser canvas falls back when a named family is not installed.
pub struct FontBook {
    db: fontdb::Database,
}

impl FontBook {
    /// Build a font book from the configured sources.
    pub fn load(sources: &FontSources) -> Self {
        let mut db = fontdb::Database::new();
        if sources.load_system {
            db.load_system_fonts();
        }
        for dir in &sources.dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self { db }
    }

    /// Empty font book; faces can be added with [`FontBook::add_font_data`].
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    /// Register an in-memory font file.
    pub fn add_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    /// Number of faces known.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// True when no face at all is available.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Pick the face best matching `family` at `weight`.
    pub fn resolve(&self, family: &str, weight: u16) -> Option<ResolvedFace> {
        let id = self.query(family, weight)?;
        self.load_face(id, family)
    }

    /// Id of the face best matching `family` at `weight`, without reading its bytes.
    pub(crate) fn query(&self, family: &str, weight: u16) -> Option<fontdb::ID> {
        let families = [fontdb::Family::Name(family), fontdb::Family::SansSerif];
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(weight.clamp(1, 1000)),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        self.db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
    }

    /// Read the face `id`, copying its file bytes.
    pub(crate) fn load_face(&self, id: fontdb::ID, requested: &str) -> Option<ResolvedFace> {
        let info = self.db.face(id)?;
        let face_family = info
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| requested.to_owned());
        let face_weight = info.weight.0;
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;

        Some(ResolvedFace {
            id,
            family: face_family,
            weight: face_weight,
            data: Arc::new(data),
            index,
        })
    }

    /// Faces that live at a non-zero index inside a collection file.
    #[cfg(test)]
    pub(crate) fn collection_faces(&self) -> Vec<fontdb::ID> {
        self.db
            .faces()
            .filter(|f| f.index > 0)
            .map(|f| f.id)
            .collect()
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
