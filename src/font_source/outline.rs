//! Glyph outline extraction
//!
//! Outlines arrive in font design units with y pointing up. [`OutlineSink`]
//! scales them to pixels, flips y, and places them at a pen position so the
//! resulting [`BezPath`] is in canvas coordinates (y down).

use crate::font_source::metrics::{GlyphSource, ShapedGlyph};
use kurbo::{BezPath, Point};

/// Receives outline commands and records them into a kurbo path
pub struct OutlineSink<'a> {
    path: &'a mut BezPath,
    scale: f64,
    origin: Point,
}

impl<'a> OutlineSink<'a> {
    /// `scale` converts font units to pixels; `origin` is the pen position
    /// on the baseline in canvas coordinates.
    pub fn new(path: &'a mut BezPath, scale: f64, origin: Point) -> Self {
        Self {
            path,
            scale,
            origin,
        }
    }

    fn map(&self, x: f32, y: f32) -> Point {
        Point::new(
            self.origin.x + f64::from(x) * self.scale,
            self.origin.y - f64::from(y) * self.scale,
        )
    }
}

impl ttf_parser::OutlineBuilder for OutlineSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p1 = self.map(x1, y1);
        let p = self.map(x, y);
        self.path.quad_to(p1, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p1 = self.map(x1, y1);
        let p2 = self.map(x2, y2);
        let p = self.map(x, y);
        self.path.curve_to(p1, p2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Build the outline of `text` set at `size_px` with its baseline starting
/// at `origin`. Glyphs without an outline (spaces) only advance the pen.
pub fn text_path(font: &dyn GlyphSource, text: &str, size_px: f32, origin: Point) -> BezPath {
    let glyphs = font.shape(text);
    glyphs_path(font, &glyphs, size_px, origin)
}

/// Same as [`text_path`] for glyphs that were already shaped
pub fn glyphs_path(
    font: &dyn GlyphSource,
    glyphs: &[ShapedGlyph],
    size_px: f32,
    origin: Point,
) -> BezPath {
    let scale = f64::from(size_px) / f64::from(font.units_per_em().max(1));
    let mut path = BezPath::new();
    let mut pen_x = 0.0_f64;

    for glyph in glyphs {
        let glyph_origin = Point::new(
            origin.x + (pen_x + f64::from(glyph.x_offset)) * scale,
            origin.y - f64::from(glyph.y_offset) * scale,
        );
        let mut sink = OutlineSink::new(&mut path, scale, glyph_origin);
        font.outline(glyph.glyph_id, &mut sink);
        pen_x += f64::from(glyph.x_advance);
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::metrics::test_font::BoxFont;
    use kurbo::{PathEl, Shape};
    use ttf_parser::OutlineBuilder;

    #[test]
    fn test_sink_flips_and_scales() {
        let mut path = BezPath::new();
        let mut sink = OutlineSink::new(&mut path, 0.5, Point::new(10.0, 100.0));
        sink.move_to(0.0, 0.0);
        sink.line_to(20.0, 40.0);
        sink.close();

        let elements = path.elements();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0], PathEl::MoveTo(Point::new(10.0, 100.0)));
        assert_eq!(elements[1], PathEl::LineTo(Point::new(20.0, 80.0)));
        assert_eq!(elements[2], PathEl::ClosePath);
    }

    #[test]
    fn test_text_path_advances_pen() {
        let font = BoxFont::default();
        // 1000 upm, 500 unit advance -> 20px per glyph at 40px
        let path = text_path(&font, "ab", 40.0, Point::new(0.0, 40.0));
        let bbox = path.bounding_box();
        assert!(bbox.x0 >= 0.0);
        assert!(bbox.x1 <= 40.0 + 1e-9);
        assert!(bbox.y1 <= 40.0 + 1e-9);
    }

    #[test]
    fn test_spaces_produce_no_outline() {
        let font = BoxFont::default();
        let path = text_path(&font, "   ", 40.0, Point::ZERO);
        assert!(path.elements().is_empty());
    }
}
