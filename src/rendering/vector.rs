//! Vector export
//!
//! Loads the style's font file, extracts the outline of the whole name as a
//! single path and wraps it in a minimal SVG document.

use crate::core::errors::SignatureResult;
use crate::font_source::catalog::StyleSpec;
use crate::font_source::metrics::{load_vector_font, GlyphSource};
use crate::font_source::outline::text_path;
use crate::rendering::artifact::{ExportArtifact, ExportFormat};
use crate::rendering::layout::{export_layout, EXPORT_PADDING};
use kurbo::{BezPath, PathEl, Point};
use std::fmt::Write;
use tracing::debug;

/// Decimal places kept in path coordinates
pub const PATH_PRECISION: usize = 2;

/// Export `name` as SVG using the style's vector font file.
///
/// An empty name returns `Ok(None)` without touching the file system. A
/// missing or broken font file returns `FontLoad` and nothing is produced.
pub async fn export_vector(name: &str, spec: &StyleSpec) -> SignatureResult<Option<ExportArtifact>> {
    if name.is_empty() {
        debug!("Skipping SVG export: name is empty");
        return Ok(None);
    }
    let font = load_vector_font(&spec.vector_font_path).await?;
    Ok(render_svg(name, spec, &font))
}

/// Build the SVG artifact from an already loaded font
pub fn render_svg(name: &str, spec: &StyleSpec, font: &dyn GlyphSource) -> Option<ExportArtifact> {
    let layout = export_layout(name, spec, font, true)?;
    let origin = Point::new(f64::from(layout.origin_x), f64::from(layout.origin_y));
    let path = text_path(font, name, layout.effective_font_size, origin);

    let width = layout.text_width + EXPORT_PADDING * 2.0;
    let height = layout.text_height + EXPORT_PADDING * 2.0;
    let svg = svg_document(width, height, &path_data(&path, PATH_PRECISION));
    debug!(
        "Rendered SVG export {}x{} with {}",
        format_number(f64::from(width), PATH_PRECISION),
        format_number(f64::from(height), PATH_PRECISION),
        layout.effective_font_specifier
    );

    Some(ExportArtifact::new(svg.into_bytes(), ExportFormat::Svg, name))
}

/// Wrap path data in an SVG document with a single black path
pub fn svg_document(width: f32, height: f32, path_data: &str) -> String {
    format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n  <path d=\"{}\" fill=\"black\"/>\n</svg>\n",
        format_number(f64::from(width), PATH_PRECISION),
        format_number(f64::from(height), PATH_PRECISION),
        path_data
    )
}

/// Serialize a path as SVG path data (`M`, `L`, `Q`, `C`, `Z`)
pub fn path_data(path: &BezPath, decimals: usize) -> String {
    let mut out = String::new();
    let mut push = |command: char, points: &[Point]| {
        out.push(command);
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(
                out,
                "{} {}",
                format_number(p.x, decimals),
                format_number(p.y, decimals)
            );
        }
    };

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => push('M', &[p]),
            PathEl::LineTo(p) => push('L', &[p]),
            PathEl::QuadTo(p1, p) => push('Q', &[p1, p]),
            PathEl::CurveTo(p1, p2, p) => push('C', &[p1, p2, p]),
            PathEl::ClosePath => push('Z', &[]),
        }
    }
    out
}

/// Round to `decimals` places and drop trailing zeros
fn format_number(value: f64, decimals: usize) -> String {
    let mut s = format!("{value:.decimals$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SignatureError;
    use crate::font_source::catalog::{FontCatalog, StyleId};
    use crate::font_source::metrics::test_font::BoxFont;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.0, 2), "12");
        assert_eq!(format_number(12.5, 2), "12.5");
        assert_eq!(format_number(12.346, 2), "12.35");
        assert_eq!(format_number(-0.001, 2), "0");
        assert_eq!(format_number(100.0, 0), "100");
    }

    #[test]
    fn test_path_data_commands() {
        let mut path = BezPath::new();
        path.move_to((1.0, 2.0));
        path.line_to((3.5, 4.25));
        path.quad_to((5.0, 6.0), (7.0, 8.0));
        path.curve_to((1.0, 1.0), (2.0, 2.0), (3.0, 3.0));
        path.close_path();

        assert_eq!(
            path_data(&path, 2),
            "M1 2L3.5 4.25Q5 6 7 8C1 1 2 2 3 3Z"
        );
    }

    #[test]
    fn test_svg_document_is_well_formed() {
        let font = BoxFont::default();
        let spec = FontCatalog::default().spec_for(StyleId::Elegant);
        let artifact = render_svg("Ada", &spec, &font).expect("artifact");

        assert_eq!(artifact.mime_type, "image/svg+xml");
        assert_eq!(artifact.suggested_filename, "Ada.svg");

        let text = String::from_utf8(artifact.bytes).expect("utf8");
        let doc = roxmltree::Document::parse(&text).expect("valid xml");
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.attribute("width"), Some("100"));
        assert_eq!(root.attribute("height"), Some("88"));

        let paths: Vec<_> = root
            .children()
            .filter(|n| n.tag_name().name() == "path")
            .collect();
        assert_eq!(paths.len(), 1, "expected a single path");
        assert_eq!(paths[0].attribute("fill"), Some("black"));
        let d = paths[0].attribute("d").expect("path data");
        // Three boxes, one subpath each
        assert_eq!(d.matches('M').count(), 3);
        assert_eq!(d.matches('Z').count(), 3);
        // First box starts at x = 20 + 50 units * 0.04, baseline y = 60
        assert!(d.starts_with("M22 60"), "unexpected path start: {d}");
    }

    #[test]
    fn test_random_offset_moves_path() {
        let font = BoxFont::default();
        let mut spec = FontCatalog::default().spec_for(StyleId::Elegant);
        spec.offset_x = 3.0;
        spec.offset_y = -2.0;
        let artifact = render_svg("A", &spec, &font).expect("artifact");
        let text = String::from_utf8(artifact.bytes).expect("utf8");
        assert!(text.contains("d=\"M25 58"), "unexpected document: {text}");
    }

    #[tokio::test]
    async fn test_missing_font_produces_no_svg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = FontCatalog::new(dir.path(), 1.0).spec_for(StyleId::Casual);

        let result = export_vector("Ada", &spec).await;
        assert!(matches!(result, Err(SignatureError::FontLoad { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn test_empty_name_skips_font_load() {
        let spec = FontCatalog::new("/nonexistent/fonts", 1.0).spec_for(StyleId::Bold);
        let result = export_vector("", &spec).await.expect("no error");
        assert!(result.is_none());
    }
}
