//! Segmentation collaborators.
//!
//! A segmenter turns the source photo into a same-sized cutout whose background is transparent.

/// External background-removal programs.
pub mod command;
/// The segmentation seam and file-backed adapters.
pub mod segmenter;
