//! PNG export via `tiny-skia`.
//!
//! Rasterises the same picture as [`to_svg`](crate::to_svg) with
//! anti-aliasing and returns the encoded bytes. No I/O.

use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use keypoints_core::{Dimensions, Point, Polyline};

use crate::drawing::{BACKGROUND, Drawing, INITIAL_POINT, OUTLINE, RenderStyle};

/// Errors that can occur while rasterising a drawing.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The canvas has a zero dimension or is too large to allocate.
    #[error("cannot allocate a {width}x{height} canvas")]
    InvalidDimensions {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

fn paint((r, g, b): (u8, u8, u8)) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);
    paint.anti_alias = true;
    paint
}

#[allow(clippy::cast_possible_truncation)]
fn fill_dots(pixmap: &mut Pixmap, points: &[Point], radius: f64, paint: &Paint<'_>) {
    for p in points {
        let Some(circle) = PathBuilder::from_circle(p.x as f32, p.y as f32, radius as f32) else {
            continue;
        };
        pixmap.fill_path(
            &circle,
            paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

#[allow(clippy::cast_possible_truncation)]
fn stroke_outline(pixmap: &mut Pixmap, outline: &Polyline, width: f64, paint: &Paint<'_>) {
    let Some((first, rest)) = outline.points().split_first() else {
        return;
    };

    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();

    // A single point produces no drawable path.
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}

/// Rasterise a drawing and encode it as PNG.
///
/// # Errors
///
/// Returns [`ExportError::InvalidDimensions`] if the canvas cannot be
/// allocated, and [`ExportError::Encode`] if PNG encoding fails.
pub fn to_png(
    drawing: &Drawing<'_>,
    dimensions: Dimensions,
    style: &RenderStyle,
) -> Result<Vec<u8>, ExportError> {
    let Dimensions { width, height } = dimensions;
    let mut pixmap =
        Pixmap::new(width, height).ok_or(ExportError::InvalidDimensions { width, height })?;

    let (r, g, b) = BACKGROUND;
    pixmap.fill(Color::from_rgba8(r, g, b, 255));

    fill_dots(
        &mut pixmap,
        drawing.initial,
        style.point_radius,
        &paint(INITIAL_POINT),
    );
    let outline_paint = paint(OUTLINE);
    stroke_outline(&mut pixmap, drawing.outline, style.line_width, &outline_paint);
    fill_dots(
        &mut pixmap,
        drawing.outline.points(),
        style.point_radius,
        &outline_paint,
    );

    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> image::RgbaImage {
        image::load_from_memory(bytes).unwrap().to_rgba8()
    }

    fn square_with_bump() -> Vec<Point> {
        vec![
            Point::new(10.0, 10.0),
            Point::new(50.0, 14.0),
            Point::new(90.0, 10.0),
            Point::new(90.0, 90.0),
            Point::new(10.0, 90.0),
        ]
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        let initial = square_with_bump();
        let outline = Polyline::new(vec![]);
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let dims = Dimensions {
            width: 0,
            height: 10,
        };
        let err = to_png(&drawing, dims, &RenderStyle::default()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidDimensions {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn png_has_requested_size() {
        let initial = square_with_bump();
        let outline = Polyline::new(vec![initial[0], initial[2], initial[3], initial[4]]);
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let dims = Dimensions {
            width: 120,
            height: 100,
        };
        let img = decode(&to_png(&drawing, dims, &RenderStyle::default()).unwrap());
        assert_eq!(img.dimensions(), (120, 100));
    }

    #[test]
    fn colours_land_where_expected() {
        let initial = square_with_bump();
        let outline = Polyline::new(vec![initial[0], initial[2], initial[3], initial[4]]);
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let style = RenderStyle {
            point_radius: 3.0,
            line_width: 1.0,
        };
        let dims = Dimensions {
            width: 100,
            height: 100,
        };
        let img = decode(&to_png(&drawing, dims, &style).unwrap());

        // Discarded point: red marker only.
        assert_eq!(img.get_pixel(50, 14).0, [255, 0, 0, 255]);
        // Surviving corner: green marker drawn over the red one.
        assert_eq!(img.get_pixel(90, 90).0, [0, 255, 0, 255]);
        // Interior of the outline stays background.
        assert_eq!(img.get_pixel(50, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn single_point_outline_draws_only_a_dot() {
        let initial = vec![Point::new(20.0, 20.0)];
        let outline = Polyline::new(initial.clone());
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let dims = Dimensions {
            width: 40,
            height: 40,
        };
        let img = decode(&to_png(&drawing, dims, &RenderStyle::default()).unwrap());
        assert_eq!(img.get_pixel(20, 20).0, [0, 255, 0, 255]);
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 255]);
    }
}
