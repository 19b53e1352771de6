//! Font catalog
//!
//! Maps a style id to the font configuration used to draw it. The catalog
//! is a plain data table: adding a style means adding a row to
//! [`CATALOG_ENTRIES`] and a variant to [`StyleId`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Size used by every named style, in pixels
pub const CANONICAL_FONT_SIZE: f32 = 40.0;

/// Inclusive size range of the random style, in pixels
pub const RANDOM_SIZE_RANGE: (f32, f32) = (30.0, 50.0);

/// Largest random offset applied to the draw origin, in pixels
pub const RANDOM_MAX_OFFSET: f32 = 10.0;

/// Supported signature styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleId {
    Elegant,
    Bold,
    Casual,
    #[default]
    Random,
}

impl StyleId {
    /// All styles in the order they are offered to the user
    pub const ALL: [StyleId; 4] = [
        StyleId::Elegant,
        StyleId::Bold,
        StyleId::Casual,
        StyleId::Random,
    ];

    /// Parse a style id, falling back to the default style for unknown names
    pub fn parse(name: &str) -> Self {
        Self::try_parse(name).unwrap_or_default()
    }

    /// Parse a style id, returning `None` for unknown names
    pub fn try_parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "elegant" => Some(StyleId::Elegant),
            "bold" => Some(StyleId::Bold),
            "casual" => Some(StyleId::Casual),
            "random" => Some(StyleId::Random),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleId::Elegant => "elegant",
            StyleId::Bold => "bold",
            StyleId::Casual => "casual",
            StyleId::Random => "random",
        }
    }

    /// Capitalized name for menus and help output
    pub fn display_name(&self) -> &'static str {
        match self {
            StyleId::Elegant => "Elegant",
            StyleId::Bold => "Bold",
            StyleId::Casual => "Casual",
            StyleId::Random => "Random",
        }
    }

    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(StyleId::as_str).collect()
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the catalog table
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: StyleId,
    pub family: &'static str,
    pub file_name: &'static str,
    pub size_px: f32,
}

/// The fixed styles. The random style draws its font from these rows.
pub const CATALOG_ENTRIES: [CatalogEntry; 3] = [
    CatalogEntry {
        id: StyleId::Elegant,
        family: "Mrs Saint Delafield",
        file_name: "MrsSaintDelafield-Regular.ttf",
        size_px: CANONICAL_FONT_SIZE,
    },
    CatalogEntry {
        id: StyleId::Bold,
        family: "Yesteryear",
        file_name: "Yesteryear-Regular.ttf",
        size_px: CANONICAL_FONT_SIZE,
    },
    CatalogEntry {
        id: StyleId::Casual,
        family: "Borel",
        file_name: "Borel-Regular.ttf",
        size_px: CANONICAL_FONT_SIZE,
    },
];

/// Resolved font configuration for one render
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpec {
    pub id: StyleId,
    /// Family name the preview registry resolves
    pub display_family: String,
    pub display_size_px: f32,
    /// Font file the vector exporter loads
    pub vector_font_path: PathBuf,
    pub export_size_px: f32,
    /// Origin offset; zero for every style except random
    pub offset_x: f32,
    pub offset_y: f32,
}

impl StyleSpec {
    /// CSS-style font specifier, e.g. `40px "Borel"`
    pub fn font_specifier(&self, size_px: f32) -> String {
        format!("{}px \"{}\"", format_size(size_px), self.display_family)
    }
}

fn format_size(size_px: f32) -> String {
    if size_px.fract() == 0.0 {
        format!("{size_px:.0}")
    } else {
        size_px.to_string()
    }
}

/// Lookup table from style id to [`StyleSpec`]
#[derive(Debug, Clone)]
pub struct FontCatalog {
    fonts_dir: PathBuf,
    export_scale: f32,
}

impl FontCatalog {
    /// Create a catalog whose vector fonts live in `fonts_dir`.
    ///
    /// `export_scale` multiplies the display size to get the export size.
    /// Non-positive or non-finite scales are replaced by 1.0.
    pub fn new(fonts_dir: impl Into<PathBuf>, export_scale: f32) -> Self {
        let export_scale = if export_scale.is_finite() && export_scale > 0.0 {
            export_scale
        } else {
            1.0
        };
        Self {
            fonts_dir: fonts_dir.into(),
            export_scale,
        }
    }

    pub fn fonts_dir(&self) -> &Path {
        &self.fonts_dir
    }

    pub fn export_scale(&self) -> f32 {
        self.export_scale
    }

    /// Family names of every catalog font
    pub fn families(&self) -> impl Iterator<Item = &'static str> {
        CATALOG_ENTRIES.iter().map(|entry| entry.family)
    }

    /// Spec for `id`, drawing any random choices from the thread RNG
    pub fn spec_for(&self, id: StyleId) -> StyleSpec {
        self.spec_for_with(id, &mut rand::thread_rng())
    }

    /// Spec for `id`, drawing any random choices from `rng`
    pub fn spec_for_with<R: Rng + ?Sized>(&self, id: StyleId, rng: &mut R) -> StyleSpec {
        match CATALOG_ENTRIES.iter().find(|entry| entry.id == id) {
            Some(entry) => self.spec_from_entry(entry, entry.size_px, 0.0, 0.0),
            None => {
                let entry = &CATALOG_ENTRIES[rng.gen_range(0..CATALOG_ENTRIES.len())];
                let size = rng.gen_range(RANDOM_SIZE_RANGE.0..=RANDOM_SIZE_RANGE.1);
                let offset_x = rng.gen_range(-RANDOM_MAX_OFFSET..=RANDOM_MAX_OFFSET);
                let offset_y = rng.gen_range(-RANDOM_MAX_OFFSET..=RANDOM_MAX_OFFSET);
                let mut spec = self.spec_from_entry(entry, size, offset_x, offset_y);
                spec.id = StyleId::Random;
                spec
            }
        }
    }

    fn spec_from_entry(
        &self,
        entry: &CatalogEntry,
        size_px: f32,
        offset_x: f32,
        offset_y: f32,
    ) -> StyleSpec {
        StyleSpec {
            id: entry.id,
            display_family: entry.family.to_string(),
            display_size_px: size_px,
            vector_font_path: self.fonts_dir.join(entry.file_name),
            export_size_px: size_px * self.export_scale,
            offset_x,
            offset_y,
        }
    }
}

impl Default for FontCatalog {
    fn default() -> Self {
        Self::new("fonts", 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_style_has_a_spec() {
        let catalog = FontCatalog::default();
        for id in StyleId::ALL {
            let spec = catalog.spec_for(id);
            assert_eq!(spec.id, id);
            assert!(!spec.display_family.is_empty());
            assert!(spec.display_size_px > 0.0);
        }
    }

    #[test]
    fn test_unknown_style_falls_back_to_default() {
        assert_eq!(StyleId::parse("calligraphic"), StyleId::Random);
        assert_eq!(StyleId::parse(""), StyleId::default());
        assert_eq!(StyleId::parse(" Elegant "), StyleId::Elegant);
        assert_eq!(StyleId::try_parse("calligraphic"), None);
    }

    #[test]
    fn test_elegant_spec_matches_table() {
        let catalog = FontCatalog::new("/srv/fonts", 1.0);
        let spec = catalog.spec_for(StyleId::Elegant);
        assert_eq!(spec.display_family, "Mrs Saint Delafield");
        assert_eq!(spec.display_size_px, 40.0);
        assert_eq!(spec.export_size_px, 40.0);
        assert_eq!(
            spec.vector_font_path,
            PathBuf::from("/srv/fonts/MrsSaintDelafield-Regular.ttf")
        );
        assert_eq!((spec.offset_x, spec.offset_y), (0.0, 0.0));
        assert_eq!(spec.font_specifier(40.0), "40px \"Mrs Saint Delafield\"");
    }

    #[test]
    fn test_export_scale_applies_to_export_size_only() {
        let catalog = FontCatalog::new("fonts", 2.0);
        let spec = catalog.spec_for(StyleId::Bold);
        assert_eq!(spec.display_size_px, 40.0);
        assert_eq!(spec.export_size_px, 80.0);

        let clamped = FontCatalog::new("fonts", -3.0);
        assert_eq!(clamped.export_scale(), 1.0);
    }

    #[test]
    fn test_random_spec_stays_in_documented_ranges() {
        let catalog = FontCatalog::default();
        let families: Vec<&str> = catalog.families().collect();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let spec = catalog.spec_for_with(StyleId::Random, &mut rng);
            assert_eq!(spec.id, StyleId::Random);
            assert!(families.contains(&spec.display_family.as_str()));
            assert!((30.0..=50.0).contains(&spec.display_size_px));
            assert!(spec.offset_x.abs() <= RANDOM_MAX_OFFSET);
            assert!(spec.offset_y.abs() <= RANDOM_MAX_OFFSET);
        }
    }

    #[test]
    fn test_random_spec_varies_between_calls() {
        let catalog = FontCatalog::default();
        let mut rng = StdRng::seed_from_u64(42);
        let first = catalog.spec_for_with(StyleId::Random, &mut rng);
        let varied = (0..20)
            .map(|_| catalog.spec_for_with(StyleId::Random, &mut rng))
            .any(|spec| spec != first);
        assert!(varied, "Random style should not repeat the same spec");
    }
}
