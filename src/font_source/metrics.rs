//! Glyph metrics
//!
//! This module contains the [`GlyphSource`] abstraction shared by the
//! preview and export paths, the parsed-font implementation of it, and
//! text measurement helpers.

use crate::core::errors::{SignatureError, SignatureResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use ttf_parser::OutlineBuilder;

/// A shaped glyph, positioned in font units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u32,
    pub x_advance: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    /// Byte offset of the source character in the input text
    pub cluster: u32,
}

/// Measured size of a run of text
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
}

/// A font face that can shape text and hand out glyph outlines
pub trait GlyphSource: Send + Sync {
    /// Family name as recorded in the font
    fn family_name(&self) -> &str;

    fn units_per_em(&self) -> u16;

    /// Shape `text` into positioned glyphs (advances in font units)
    fn shape(&self, text: &str) -> Vec<ShapedGlyph>;

    /// Stream the outline of `glyph_id` into `sink`. Returns `false` when
    /// the glyph has no outline.
    fn outline(&self, glyph_id: u32, sink: &mut dyn OutlineBuilder) -> bool;
}

/// Advance width of `text` at `size_px`
pub fn measure(font: &dyn GlyphSource, text: &str, size_px: f32) -> TextMetrics {
    let advance: f32 = font.shape(text).iter().map(|g| g.x_advance).sum();
    let scale = size_px / f32::from(font.units_per_em().max(1));
    TextMetrics {
        width: advance * scale,
    }
}

/// A font file held in memory
///
/// Shaping goes through harfrust, outlines through ttf-parser. Both parse
/// the bytes on demand, so a `LoadedFont` is cheap to share.
#[derive(Clone)]
pub struct LoadedFont {
    data: Arc<Vec<u8>>,
    index: u32,
    family: String,
    full_name: Option<String>,
    units_per_em: u16,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("family", &self.family)
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl LoadedFont {
    /// Parse font bytes, validating that face `index` exists
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self, String> {
        let face = ttf_parser::Face::parse(&data, index)
            .map_err(|e| format!("Failed to parse font face {index}: {e}"))?;

        let family = Self::name_entry(&face, ttf_parser::name_id::TYPOGRAPHIC_FAMILY)
            .or_else(|| Self::name_entry(&face, ttf_parser::name_id::FAMILY))
            .unwrap_or_else(|| "Untitled".to_string());
        let full_name = Self::name_entry(&face, ttf_parser::name_id::FULL_NAME);
        let units_per_em = face.units_per_em();

        Ok(Self {
            data: Arc::new(data),
            index,
            family,
            full_name,
            units_per_em,
        })
    }

    /// Helper to read a unicode name-table entry
    fn name_entry(face: &ttf_parser::Face<'_>, name_id: u16) -> Option<String> {
        face.names()
            .into_iter()
            .filter(|name| name.name_id == name_id && name.is_unicode())
            .find_map(|name| name.to_string())
    }

    /// Full font name, falling back to the family name
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.family)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl GlyphSource for LoadedFont {
    fn family_name(&self) -> &str {
        &self.family
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn shape(&self, text: &str) -> Vec<ShapedGlyph> {
        if text.is_empty() {
            return Vec::new();
        }

        let font_ref = match harfrust::FontRef::from_index(&self.data, self.index) {
            Ok(font_ref) => font_ref,
            Err(e) => {
                warn!("Failed to create harfrust FontRef for {}: {e:?}", self.family);
                return Vec::new();
            }
        };

        let shaper_data = harfrust::ShaperData::new(&font_ref);
        let shaper = shaper_data.shaper(&font_ref).build();

        let mut buffer = harfrust::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let glyph_buffer = shaper.shape(buffer, &[]);
        let infos = glyph_buffer.glyph_infos();
        let positions = glyph_buffer.glyph_positions();

        infos
            .iter()
            .zip(positions.iter())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                x_advance: pos.x_advance as f32,
                x_offset: pos.x_offset as f32,
                y_offset: pos.y_offset as f32,
                cluster: info.cluster,
            })
            .collect()
    }

    fn outline(&self, glyph_id: u32, sink: &mut dyn OutlineBuilder) -> bool {
        let Ok(id) = u16::try_from(glyph_id) else {
            return false;
        };
        match ttf_parser::Face::parse(&self.data, self.index) {
            Ok(face) => face.outline_glyph(ttf_parser::GlyphId(id), sink).is_some(),
            Err(_) => false,
        }
    }
}

/// Load a vector font file without blocking the caller's thread.
///
/// A missing or unparsable file yields [`SignatureError::FontLoad`].
pub async fn load_vector_font(path: &Path) -> SignatureResult<LoadedFont> {
    debug!("Loading vector font from {}", path.display());
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| SignatureError::font_load(path, e))?;
    let font = LoadedFont::from_bytes(data, 0).map_err(|e| SignatureError::font_load(path, e))?;
    debug!(
        "Loaded '{}' ({} units per em)",
        font.display_name(),
        font.units_per_em
    );
    Ok(font)
}

/// Deterministic stand-in font for tests
#[cfg(test)]
pub(crate) mod test_font {
    use super::*;

    /// Every character advances by `advance` units and, unless it is
    /// whitespace, draws a box 400 units wide and 700 units tall.
    pub struct BoxFont {
        pub family: String,
        pub units_per_em: u16,
        pub advance: f32,
    }

    impl Default for BoxFont {
        fn default() -> Self {
            Self::named("Box Sans")
        }
    }

    impl BoxFont {
        pub fn named(family: &str) -> Self {
            Self {
                family: family.to_string(),
                units_per_em: 1000,
                advance: 500.0,
            }
        }
    }

    impl GlyphSource for BoxFont {
        fn family_name(&self) -> &str {
            &self.family
        }

        fn units_per_em(&self) -> u16 {
            self.units_per_em
        }

        fn shape(&self, text: &str) -> Vec<ShapedGlyph> {
            text.char_indices()
                .map(|(i, ch)| ShapedGlyph {
                    glyph_id: ch as u32,
                    x_advance: self.advance,
                    cluster: i as u32,
                    ..Default::default()
                })
                .collect()
        }

        fn outline(&self, glyph_id: u32, sink: &mut dyn OutlineBuilder) -> bool {
            if char::from_u32(glyph_id).map_or(true, char::is_whitespace) {
                return false;
            }
            sink.move_to(50.0, 0.0);
            sink.line_to(450.0, 0.0);
            sink.line_to(450.0, 700.0);
            sink.line_to(50.0, 700.0);
            sink.close();
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_font::BoxFont;
    use super::*;

    #[test]
    fn test_measure_scales_advances() {
        let font = BoxFont::default();
        assert_eq!(measure(&font, "Ada", 40.0).width, 60.0);
        assert_eq!(measure(&font, "", 40.0).width, 0.0);
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = LoadedFont::from_bytes(b"definitely not a font".to_vec(), 0);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_vector_font_is_a_font_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Missing-Regular.ttf");
        match load_vector_font(&path).await {
            Err(SignatureError::FontLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected FontLoad, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparsable_vector_font_is_a_font_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Broken-Regular.ttf");
        std::fs::write(&path, b"\0\x01\0\0garbage").expect("write");
        let result = load_vector_font(&path).await;
        assert!(matches!(result, Err(SignatureError::FontLoad { .. })));
    }

    #[test]
    #[ignore = "Requires a font file - set SIGGEN_TEST_FONT to a .ttf path"]
    fn test_real_font_shapes_and_outlines() {
        let Ok(path) = std::env::var("SIGGEN_TEST_FONT") else {
            println!("SIGGEN_TEST_FONT not set, skipping test");
            return;
        };
        let data = std::fs::read(&path).expect("Failed to read test font");
        let font = LoadedFont::from_bytes(data, 0).expect("Failed to parse test font");

        let glyphs = font.shape("Ada");
        assert!(!glyphs.is_empty(), "Shaping should produce glyphs");
        assert!(measure(&font, "Ada", 40.0).width > 0.0);

        let path = crate::font_source::outline::text_path(&font, "Ada", 40.0, kurbo::Point::ZERO);
        assert!(!path.elements().is_empty(), "Outline should not be empty");
    }
}
