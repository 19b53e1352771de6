//! Drawing surfaces
//!
//! A [`DrawingSurface`] is an exclusively owned RGBA pixel buffer with
//! explicit `clear` and `draw_text` operations. The session owns one as the
//! visible preview; the raster exporter allocates a fresh one per export.

use crate::core::errors::{SignatureError, SignatureResult};
use crate::font_source::metrics::GlyphSource;
use crate::font_source::outline::text_path;
use kurbo::{BezPath, PathEl, Point};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Default size of the visible preview canvas
pub const PREVIEW_CANVAS_SIZE: (u32, u32) = (400, 200);

/// Pixel surface text is drawn onto
pub struct DrawingSurface {
    pixmap: Pixmap,
    /// Color `clear` resets to; transparent when `None`
    background: Option<Color>,
}

impl std::fmt::Debug for DrawingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("background", &self.background)
            .finish()
    }
}

impl DrawingSurface {
    /// Allocate a transparent surface
    pub fn new(width: u32, height: u32) -> SignatureResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            SignatureError::RenderSurfaceUnavailable(format!(
                "cannot allocate a {width}x{height} surface"
            ))
        })?;
        Ok(Self {
            pixmap,
            background: None,
        })
    }

    /// Allocate a surface filled with an opaque background
    pub fn with_background(width: u32, height: u32, background: Color) -> SignatureResult<Self> {
        let mut surface = Self::new(width, height)?;
        surface.background = Some(background);
        surface.clear();
        Ok(surface)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Reset every pixel to the background
    pub fn clear(&mut self) {
        self.pixmap.fill(self.background.unwrap_or(Color::TRANSPARENT));
    }

    /// Fill `text` in black with its baseline starting at `(x, y)`
    pub fn draw_text(&mut self, font: &dyn GlyphSource, text: &str, size_px: f32, x: f32, y: f32) {
        let path = text_path(font, text, size_px, Point::new(f64::from(x), f64::from(y)));
        self.fill(&path, Color::BLACK);
    }

    /// Fill an arbitrary path, ignoring empty ones
    pub fn fill(&mut self, path: &BezPath, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Whether nothing but the background is on the surface
    pub fn is_blank(&self) -> bool {
        let background = self
            .background
            .map(|c| c.premultiply().to_color_u8())
            .map(|c| [c.red(), c.green(), c.blue(), c.alpha()])
            .unwrap_or([0, 0, 0, 0]);
        self.pixmap
            .data()
            .chunks_exact(4)
            .all(|px| px == background)
    }

    /// Encode as PNG, keeping transparency
    pub fn encode_png(&self) -> SignatureResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| SignatureError::Encode(e.to_string()))
    }

    /// Straight (non-premultiplied) RGBA bytes, row major
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }
}

/// Convert a kurbo path to a tiny-skia path; `None` when it has no segments
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32)
            }
            PathEl::CurveTo(p1, p2, p) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}
