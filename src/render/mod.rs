//! Compositing into a single raster.

/// Background, text and cutout compositing.
pub mod compositor;
/// Rendered output frames.
pub mod frame;
