//! SVG export serializer.
//!
//! Builds the document with the [`svg`] crate, which handles XML escaping
//! and path data formatting. Input points go in one `<g>` of red
//! `<circle>`s; the outline is a closed `<path>` (`M`, `L`, ..., `z`)
//! followed by a `<g>` of green circles.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Group, Path, Rectangle, Title};
use svg::node::{Text, Value};

use keypoints_core::{Dimensions, Point, Polyline};

use crate::drawing::{BACKGROUND, Drawing, INITIAL_POINT, OUTLINE, RenderStyle, css_rgb};

/// Metadata to embed in the SVG document.
///
/// When present, a `<title>` and/or `<desc>` element is emitted
/// immediately after the opening `<svg>` tag.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, typically the shape file stem.
    pub title: Option<&'a str>,

    /// Document description, typically the point counts and reducer.
    pub description: Option<&'a str>,
}

/// Build a closed SVG path `d` attribute from an outline.
///
/// Uses `M` for the first point, `L` for the rest and closes back to
/// the start. Returns an empty string for an empty outline.
///
/// # Examples
///
/// ```
/// use keypoints_core::{Point, Polyline};
/// use keypoints_export::build_outline_data;
///
/// let outline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
///     Point::new(10.0, 40.0),
/// ]);
/// let d = build_outline_data(&outline);
/// assert!(d.starts_with("M10,20 L30,40 L10,40"));
/// ```
#[must_use]
pub fn build_outline_data(outline: &Polyline) -> String {
    let Some((first, rest)) = outline.points().split_first() else {
        return String::new();
    };

    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data.close()))
}

fn dot_group(id: &str, colour: (u8, u8, u8), points: &[Point], radius: f64) -> Group {
    points.iter().fold(
        Group::new().set("id", id).set("fill", css_rgb(colour)),
        |group, p| {
            group.add(
                Circle::new()
                    .set("cx", p.x)
                    .set("cy", p.y)
                    .set("r", radius),
            )
        },
    )
}

/// Serialize a drawing into an SVG document string.
///
/// The canvas uses shape coordinates directly as pixels, with the
/// `viewBox` set to `dimensions`.
///
/// # Examples
///
/// ```
/// use keypoints_core::{Dimensions, Point, Polyline};
/// use keypoints_export::{Drawing, RenderStyle, SvgMetadata, to_svg};
///
/// let initial = vec![Point::new(10.0, 10.0), Point::new(50.0, 12.0), Point::new(90.0, 10.0), Point::new(50.0, 80.0)];
/// let outline = Polyline::new(vec![initial[0], initial[2], initial[3]]);
/// let drawing = Drawing { initial: &initial, outline: &outline };
/// let metadata = SvgMetadata { title: Some("triangle"), ..SvgMetadata::default() };
/// let svg = to_svg(&drawing, Dimensions::default(), &RenderStyle::default(), &metadata);
/// assert!(svg.contains("<title>triangle</title>"));
/// assert_eq!(svg.matches("<circle").count(), 7);
/// ```
#[must_use]
pub fn to_svg(
    drawing: &Drawing<'_>,
    dimensions: Dimensions,
    style: &RenderStyle,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    doc = doc.add(
        Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", css_rgb(BACKGROUND)),
    );

    doc = doc.add(dot_group(
        "initial-points",
        INITIAL_POINT,
        drawing.initial,
        style.point_radius,
    ));

    if !drawing.outline.is_empty() {
        doc = doc.add(
            Path::new()
                .set("id", "outline")
                .set("d", build_outline_data(drawing.outline))
                .set("fill", "none")
                .set("stroke", css_rgb(OUTLINE))
                .set("stroke-width", style.line_width),
        );
    }

    doc = doc.add(dot_group(
        "outline-points",
        OUTLINE,
        drawing.outline.points(),
        style.point_radius,
    ));

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(90.0, 90.0),
            Point::new(10.0, 90.0),
        ]
    }

    // --- build_outline_data ---

    #[test]
    fn outline_data_empty() {
        assert_eq!(build_outline_data(&Polyline::new(vec![])), "");
    }

    #[test]
    fn outline_data_is_closed() {
        let d = build_outline_data(&Polyline::new(square()));
        assert!(d.starts_with("M10,10 L90,10 L90,90 L10,90"), "d = {d}");
        assert!(d.to_ascii_lowercase().ends_with('z'), "d = {d}");
    }

    #[test]
    fn outline_data_single_point() {
        let d = build_outline_data(&Polyline::new(vec![Point::new(5.0, 6.0)]));
        assert!(d.starts_with("M5,6"), "d = {d}");
        assert!(!d.contains('L'));
    }

    // --- to_svg ---

    #[test]
    fn document_has_canvas_size_and_background() {
        let initial = square();
        let outline = Polyline::new(initial.clone());
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let svg = to_svg(
            &drawing,
            Dimensions::default(),
            &RenderStyle::default(),
            &no_meta(),
        );
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains(r#"height="800""#));
        assert!(svg.contains(r#"viewBox="0 0 800 800""#));
        assert!(svg.contains(r#"fill="rgb(0,0,0)""#));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn one_circle_per_initial_and_outline_point() {
        let initial = vec![
            Point::new(10.0, 10.0),
            Point::new(50.0, 12.0),
            Point::new(90.0, 10.0),
            Point::new(90.0, 90.0),
            Point::new(10.0, 90.0),
        ];
        let outline = Polyline::new(vec![initial[0], initial[2], initial[3], initial[4]]);
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let svg = to_svg(
            &drawing,
            Dimensions::default(),
            &RenderStyle::default(),
            &no_meta(),
        );
        assert_eq!(svg.matches("<circle").count(), 9);
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains(r#"id="initial-points""#));
        assert!(svg.contains(r#"id="outline-points""#));
        assert!(svg.contains(r#"stroke="rgb(0,255,0)""#));
        assert!(svg.contains(r#"cx="50""#));
    }

    #[test]
    fn style_controls_radius_and_stroke() {
        let initial = square();
        let outline = Polyline::new(initial.clone());
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let style = RenderStyle {
            point_radius: 4.5,
            line_width: 3.0,
        };
        let svg = to_svg(&drawing, Dimensions::default(), &style, &no_meta());
        assert!(svg.contains(r#"r="4.5""#));
        assert!(svg.contains(r#"stroke-width="3""#));
    }

    #[test]
    fn empty_outline_has_no_path() {
        let initial = square();
        let outline = Polyline::new(vec![]);
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let svg = to_svg(
            &drawing,
            Dimensions::default(),
            &RenderStyle::default(),
            &no_meta(),
        );
        assert_eq!(svg.matches("<path").count(), 0);
        assert_eq!(svg.matches("<circle").count(), 4);
    }

    #[test]
    fn metadata_is_escaped() {
        let initial = square();
        let outline = Polyline::new(initial.clone());
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let metadata = SvgMetadata {
            title: Some("a<b"),
            description: Some("40 & counting"),
        };
        let svg = to_svg(
            &drawing,
            Dimensions::default(),
            &RenderStyle::default(),
            &metadata,
        );
        assert!(svg.contains("<title>a&lt;b</title>"));
        assert!(svg.contains("<desc>40 &amp; counting</desc>"));
    }

    #[test]
    fn no_metadata_elements_by_default() {
        let initial = square();
        let outline = Polyline::new(initial.clone());
        let drawing = Drawing {
            initial: &initial,
            outline: &outline,
        };
        let svg = to_svg(
            &drawing,
            Dimensions::default(),
            &RenderStyle::default(),
            &no_meta(),
        );
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
    }
}
