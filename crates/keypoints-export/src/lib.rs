//! keypoints-export: Pure renderers for reduced outlines (sans-IO)
//!
//! Draws the input points and the reduced outline. Supports SVG
//! (vector, string output) and PNG (raster, byte output).

pub mod drawing;
pub mod png;
pub mod svg;

pub use drawing::{Drawing, RenderStyle};
pub use png::{ExportError, to_png};
pub use svg::{SvgMetadata, build_outline_data, to_svg};
