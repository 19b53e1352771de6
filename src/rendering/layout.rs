//! Layout engine
//!
//! Computes where a name is drawn on the preview canvas and how large the
//! tightly cropped export surface has to be.
//!
//! Text height is approximated as `1.2 × font size` rather than taken from
//! the font's ascent and descent. The same heuristic is used by the preview
//! and by both exporters so their boxes agree.

use crate::font_source::catalog::StyleSpec;
use crate::font_source::metrics::{measure, GlyphSource};

/// Padding around the text on export surfaces, in pixels
pub const EXPORT_PADDING: f32 = 20.0;

/// Ratio of approximate glyph height to font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Placement of a name on a canvas
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// Left end of the baseline
    pub origin_x: f32,
    /// Baseline position
    pub origin_y: f32,
    pub text_width: f32,
    pub text_height: f32,
    pub effective_font_size: f32,
    /// CSS-style font string, e.g. `40px "Borel"`
    pub effective_font_specifier: String,
}

impl LayoutResult {
    /// Pixel size of the cropped export surface for this layout
    pub fn export_size(&self) -> (u32, u32) {
        export_bounds(self.text_width, self.text_height)
    }

    /// Whether the text box lies horizontally within `canvas_width`
    pub fn fits_width(&self, canvas_width: f32) -> bool {
        self.origin_x >= 0.0 && self.origin_x + self.text_width <= canvas_width
    }
}

/// Approximate glyph height for `font_size`
pub fn text_height(font_size: f32) -> f32 {
    // LINE_HEIGHT_FACTOR as 6/5, exact for whole-pixel sizes
    font_size * 6.0 / 5.0
}

/// Lay out `name` for the preview canvas at the style's display size.
///
/// Returns `None` for an empty name. Horizontal placement centers the
/// measured width. Vertical placement uses `(canvas_height + text_height / 2) / 2`,
/// which sits the baseline `text_height / 4` below true center.
pub fn layout(
    name: &str,
    spec: &StyleSpec,
    font: &dyn GlyphSource,
    canvas_width: f32,
    canvas_height: f32,
) -> Option<LayoutResult> {
    if name.is_empty() {
        return None;
    }

    let font_size = spec.display_size_px;
    let text_width = measure(font, name, font_size).width;
    let text_height = text_height(font_size);

    Some(LayoutResult {
        origin_x: (canvas_width - text_width) / 2.0 + spec.offset_x,
        origin_y: (canvas_height + text_height / 2.0) / 2.0 + spec.offset_y,
        text_width,
        text_height,
        effective_font_size: font_size,
        effective_font_specifier: spec.font_specifier(font_size),
    })
}

/// Lay out `name` on a cropped export surface at the style's export size.
///
/// The baseline starts at `(padding, padding + text_height / 1.2)`. Random
/// offsets are applied only when `apply_offset` is set.
pub fn export_layout(
    name: &str,
    spec: &StyleSpec,
    font: &dyn GlyphSource,
    apply_offset: bool,
) -> Option<LayoutResult> {
    if name.is_empty() {
        return None;
    }

    let font_size = spec.export_size_px;
    let text_width = measure(font, name, font_size).width;
    let text_height = text_height(font_size);
    let (dx, dy) = if apply_offset {
        (spec.offset_x, spec.offset_y)
    } else {
        (0.0, 0.0)
    };

    Some(LayoutResult {
        origin_x: EXPORT_PADDING + dx,
        // text_height / 1.2, i.e. the font size
        origin_y: EXPORT_PADDING + font_size + dy,
        text_width,
        text_height,
        effective_font_size: font_size,
        effective_font_specifier: spec.font_specifier(font_size),
    })
}

/// Integer surface size that holds a `text_width` × `text_height` box plus
/// padding on every side
pub fn export_bounds(text_width: f32, text_height: f32) -> (u32, u32) {
    let pad = (EXPORT_PADDING * 2.0) as u32;
    (
        text_width.max(0.0).ceil() as u32 + pad,
        text_height.max(0.0).ceil() as u32 + pad,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::catalog::{FontCatalog, StyleId};
    use crate::font_source::metrics::test_font::BoxFont;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    fn elegant() -> StyleSpec {
        FontCatalog::default().spec_for(StyleId::Elegant)
    }

    #[test]
    fn test_centering_matches_reference_values() {
        let font = BoxFont::named("Mrs Saint Delafield");
        let result = layout("Ada", &elegant(), &font, 300.0, 150.0).expect("layout");

        assert_close(result.text_height, 48.0);
        assert_close(result.origin_y, 87.0);
        // BoxFont: 3 glyphs × 500 units at 40px / 1000 upm
        assert_close(result.text_width, 60.0);
        assert_close(result.origin_x, 120.0);
        assert!(result.fits_width(300.0));
        assert_eq!(result.effective_font_size, 40.0);
        assert_eq!(
            result.effective_font_specifier,
            "40px \"Mrs Saint Delafield\""
        );
    }

    #[test]
    fn test_names_narrower_than_canvas_stay_inside() {
        let font = BoxFont::default();
        for name in ["A", "Grace", "Ada Lovelace", "Margaret Hamilton"] {
            let result = layout(name, &elegant(), &font, 400.0, 200.0).expect("layout");
            if result.text_width <= 400.0 {
                assert!(result.fits_width(400.0), "{name} should fit");
            }
        }
    }

    #[test]
    fn test_empty_name_has_no_layout() {
        let font = BoxFont::default();
        assert!(layout("", &elegant(), &font, 300.0, 150.0).is_none());
        assert!(export_layout("", &elegant(), &font, false).is_none());
    }

    #[test]
    fn test_random_offset_shifts_origin() {
        let font = BoxFont::default();
        let mut spec = elegant();
        spec.offset_x = 5.0;
        spec.offset_y = -3.0;
        let result = layout("Ada", &spec, &font, 300.0, 150.0).expect("layout");
        assert_close(result.origin_x, 125.0);
        assert_close(result.origin_y, 84.0);

        let exported = export_layout("Ada", &spec, &font, false).expect("layout");
        assert_close(exported.origin_x, 20.0);
        assert_close(exported.origin_y, 60.0);
        let jittered = export_layout("Ada", &spec, &font, true).expect("layout");
        assert_close(jittered.origin_x, 25.0);
        assert_close(jittered.origin_y, 57.0);
    }

    #[test]
    fn test_export_bounds_round_up() {
        assert_eq!(export_bounds(60.0, 48.0), (100, 88));
        assert_eq!(export_bounds(60.2, 48.0), (101, 88));
        assert_eq!(export_bounds(-1.0, 0.0), (40, 40));
    }

    #[test]
    fn test_export_layout_uses_export_size() {
        let font = BoxFont::default();
        let spec = FontCatalog::new("fonts", 2.0).spec_for(StyleId::Casual);
        let result = export_layout("Ada", &spec, &font, false).expect("layout");
        assert_eq!(result.effective_font_size, 80.0);
        assert_close(result.text_width, 120.0);
        assert_close(result.text_height, 96.0);
        assert_eq!(result.export_size(), (160, 136));
    }
}
