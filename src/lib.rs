//! textbehind places stylized text behind the subject of a photo.
//!
//! The model is a single [`EditorState`]: a source image, a subject cutout produced by an
//! external [`Segmenter`], and an ordered list of [`TextLayer`]s. The [`Compositor`] paints the
//! photo, then the text, then the cutout on top, so the text appears to sit behind the subject.
//!
//! - Load an image into an [`Editor`], which requests the cutout in the background
//! - Edit layers through pure [`EditorState`] updates
//! - Render a [`FrameRGBA`] and export it as PNG
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image decoding, colours and fonts.
pub mod assets;
/// Application configuration.
pub mod config;
/// PNG output.
pub mod encode;
/// Tracing subscriber setup.
pub mod logging;
/// Compositing.
pub mod render;
/// Editor state model.
pub mod scene;
/// Subject segmentation collaborators.
pub mod segment;
/// Editor session driving background work.
pub mod session;
/// Text layout.
pub mod text;

pub use crate::foundation::core::{
    Affine, Canvas, MAX_CANVAS_SIDE, Point, Rgba8Premul, deg_to_rad,
};
pub use crate::foundation::error::{TbiError, TbiResult};

pub use crate::assets::color::LayerColor;
pub use crate::assets::decode::{decode_image, is_supported_upload, load_image_file};
pub use crate::assets::fonts::{FontBook, FontSources, ResolvedFace};
pub use crate::assets::raster::RasterImage;
pub use crate::config::{AppConfig, LoggingConfig, RenderConfig, SegmenterConfig};
pub use crate::encode::png::{EXPORT_FILE_NAME, encode_png_premul, export_path};
pub use crate::render::compositor::{Compositor, layer_transform};
pub use crate::render::frame::{FrameRGBA, export_png};
pub use crate::scene::layer::{FONT_SIZE_MULTIPLIER, LayerAttr, LayerId, TextLayer};
pub use crate::scene::project::Project;
pub use crate::scene::state::{CutoutSlot, CutoutStatus, CutoutTicket, EditorState};
pub use crate::segment::command::CommandSegmenter;
pub use crate::segment::segmenter::{MaskSegmenter, NoSegmentation, PrecomputedCutout, Segmenter};
pub use crate::session::editor::{Editor, EditorOpts};
pub use crate::text::layout::{RunPiece, RunPlan, plan_run};
