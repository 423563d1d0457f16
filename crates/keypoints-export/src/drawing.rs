//! What gets drawn and how.
//!
//! Both renderers draw the same picture on a black canvas: every input
//! point as a red dot, then the reduced outline as a closed green polygon
//! with a green dot on each surviving point.

use keypoints_core::{Point, Polyline, Reduction};

/// RGB colour of the canvas background.
pub const BACKGROUND: (u8, u8, u8) = (0, 0, 0);
/// RGB colour of the input point markers.
pub const INITIAL_POINT: (u8, u8, u8) = (255, 0, 0);
/// RGB colour of the reduced outline and its point markers.
pub const OUTLINE: (u8, u8, u8) = (0, 255, 0);

/// The two artifacts a renderer consumes.
#[derive(Debug, Clone, Copy)]
pub struct Drawing<'a> {
    /// Untouched input points, drawn as reference markers.
    pub initial: &'a [Point],
    /// Reduced outline, drawn closed (last point joins the first).
    pub outline: &'a Polyline,
}

impl<'a> Drawing<'a> {
    /// Drawing of a finished reduction.
    #[must_use]
    pub fn from_reduction(reduction: &'a Reduction) -> Self {
        Self {
            initial: reduction.initial.points(),
            outline: &reduction.outline,
        }
    }
}

/// Marker and line sizes in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Radius of the dot drawn on each point.
    pub point_radius: f64,
    /// Stroke width of the outline.
    pub line_width: f64,
}

impl RenderStyle {
    /// Default marker radius in pixels.
    pub const DEFAULT_POINT_RADIUS: f64 = 2.0;

    /// Default outline stroke width in pixels.
    pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            point_radius: Self::DEFAULT_POINT_RADIUS,
            line_width: Self::DEFAULT_LINE_WIDTH,
        }
    }
}

/// CSS `rgb()` notation for an RGB triple.
pub(crate) fn css_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("rgb({r},{g},{b})")
}
