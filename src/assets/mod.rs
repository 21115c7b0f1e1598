//! Photo decoding, CSS colours and font lookup.

/// CSS colour values used by text layers.
pub mod color;
/// PNG/JPEG upload decoding.
pub mod decode;
/// Font discovery and family/weight resolution.
pub mod fonts;
/// Decoded raster images.
pub mod raster;
