//! Font registry for the preview path
//!
//! Resolves a display family name to a face, the way a canvas resolves a
//! CSS font family. Faces registered explicitly win; otherwise the fonts
//! directory and the system fonts are searched through fontdb. An unknown
//! family falls back to the generic sans-serif face, and failing that to
//! whatever face is loaded.

use crate::core::errors::{SignatureError, SignatureResult};
use crate::font_source::metrics::{measure, GlyphSource, LoadedFont, TextMetrics};
use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache keys for the fallback lookups; family names never start with `__`
const SANS_SERIF_KEY: &str = "__sans-serif";
const ANY_FACE_KEY: &str = "__any";

/// Registry of faces available to the preview and raster paths
pub struct FontRegistry {
    db: Database,
    /// Faces registered by family name, keyed in lowercase
    registered: HashMap<String, Arc<dyn GlyphSource>>,
    /// Cached fontdb lookups (None = not found)
    faces: HashMap<String, Option<Arc<dyn GlyphSource>>>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontRegistry {
    /// A registry that knows no fonts at all
    pub fn empty() -> Self {
        Self {
            db: Database::new(),
            registered: HashMap::new(),
            faces: HashMap::new(),
        }
    }

    /// Load the fonts in `fonts_dir` plus every system font
    pub fn with_fonts_dir(fonts_dir: &Path) -> Self {
        let mut registry = Self::empty();
        if fonts_dir.is_dir() {
            registry.db.load_fonts_dir(fonts_dir);
            debug!(
                "Loaded fonts from {} ({} faces so far)",
                fonts_dir.display(),
                registry.db.len()
            );
        } else {
            warn!("Fonts directory {} does not exist", fonts_dir.display());
        }
        registry.db.load_system_fonts();
        debug!("Font registry holds {} faces", registry.db.len());
        registry
    }

    /// Register a face under `family`, overriding any discovered face
    pub fn register(&mut self, family: &str, face: Arc<dyn GlyphSource>) {
        debug!("Registered font family '{}'", family);
        self.registered.insert(family.to_lowercase(), face);
    }

    /// Whether `family` resolves without falling back
    pub fn has_family(&self, family: &str) -> bool {
        self.registered.contains_key(&family.to_lowercase())
            || self.query(&[Family::Name(family)]).is_some()
    }

    /// Resolve `family`, falling back to sans-serif, then to any registered
    /// face, then to any face in the database. Fails only when the registry
    /// holds no usable face at all.
    pub fn resolve(&mut self, family: &str) -> SignatureResult<Arc<dyn GlyphSource>> {
        if let Some(face) = self.registered.get(&family.to_lowercase()) {
            return Ok(Arc::clone(face));
        }

        if let Some(face) = self.cached_lookup(family, &[Family::Name(family)]) {
            return Ok(face);
        }

        warn!("Font family '{}' not available, using fallback", family);
        if let Some(face) = self.cached_lookup(SANS_SERIF_KEY, &[Family::SansSerif]) {
            return Ok(face);
        }

        if let Some(face) = self.registered.values().next() {
            return Ok(Arc::clone(face));
        }

        // fontdb maps sans-serif to Arial, which many hosts lack
        self.cached_any_face().ok_or_else(|| {
            SignatureError::RenderSurfaceUnavailable(format!(
                "no font face available to draw '{family}'"
            ))
        })
    }

    /// Measure `text` set in `family` at `size_px`
    pub fn measure_raster(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
    ) -> SignatureResult<TextMetrics> {
        let face = self.resolve(family)?;
        Ok(measure(face.as_ref(), text, size_px))
    }

    fn query(&self, families: &[Family<'_>]) -> Option<fontdb::ID> {
        self.db.query(&Query {
            families,
            weight: Weight::NORMAL,
            style: Style::Normal,
            stretch: Stretch::Normal,
        })
    }

    fn cached_lookup(
        &mut self,
        key: &str,
        families: &[Family<'_>],
    ) -> Option<Arc<dyn GlyphSource>> {
        let cache_key = key.to_lowercase();
        if let Some(cached) = self.faces.get(&cache_key) {
            return cached.clone();
        }

        let face = self.load_first(self.query(families).into_iter());
        self.faces.insert(cache_key, face.clone());
        face
    }

    /// First loadable face in the database, whatever its family
    fn cached_any_face(&mut self) -> Option<Arc<dyn GlyphSource>> {
        if let Some(cached) = self.faces.get(ANY_FACE_KEY) {
            return cached.clone();
        }

        let face = self.load_first(self.db.faces().map(|info| info.id));
        if let Some(face) = &face {
            debug!("Falling back to '{}'", face.family_name());
        }
        self.faces.insert(ANY_FACE_KEY.to_string(), face.clone());
        face
    }

    fn load_first(
        &self,
        mut ids: impl Iterator<Item = fontdb::ID>,
    ) -> Option<Arc<dyn GlyphSource>> {
        ids.find_map(|id| match self.load_face_by_id(id) {
            Ok(face) => Some(Arc::new(face) as Arc<dyn GlyphSource>),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
    }

    fn load_face_by_id(&self, id: fontdb::ID) -> Result<LoadedFont, String> {
        let (src, face_index) = self
            .db
            .face_source(id)
            .ok_or_else(|| "Font source not found".to_string())?;

        let data = match src {
            Source::File(path) => std::fs::read(&path)
                .map_err(|e| format!("Failed to read font file {:?}: {}", path, e))?,
            Source::Binary(data) => data.as_ref().as_ref().to_vec(),
            Source::SharedFile(_path, data) => data.as_ref().as_ref().to_vec(),
        };

        LoadedFont::from_bytes(data, face_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_source::metrics::test_font::BoxFont;

    #[test]
    fn test_registered_family_wins() {
        let mut registry = FontRegistry::empty();
        registry.register("Borel", Arc::new(BoxFont::named("Borel")));

        let face = registry.resolve("borel").expect("registered face");
        assert_eq!(face.family_name(), "Borel");
        assert!(registry.has_family("BOREL"));
    }

    #[test]
    fn test_unknown_family_falls_back_to_registered_face() {
        let mut registry = FontRegistry::empty();
        registry.register("Yesteryear", Arc::new(BoxFont::named("Yesteryear")));

        let face = registry.resolve("Not A Real Family").expect("fallback face");
        assert_eq!(face.family_name(), "Yesteryear");
    }

    #[test]
    fn test_empty_registry_cannot_measure() {
        let mut registry = FontRegistry::empty();
        let result = registry.measure_raster("Ada", "Borel", 40.0);
        assert!(matches!(
            result,
            Err(SignatureError::RenderSurfaceUnavailable(_))
        ));
    }

    #[test]
    #[ignore = "Requires a font file - set SIGGEN_TEST_FONT to a .ttf path"]
    fn test_unknown_family_falls_back_to_database_face() {
        let Ok(path) = std::env::var("SIGGEN_TEST_FONT") else {
            println!("SIGGEN_TEST_FONT not set, skipping test");
            return;
        };
        let data = std::fs::read(&path).expect("Failed to read test font");
        let family = LoadedFont::from_bytes(data.clone(), 0)
            .expect("Failed to parse test font")
            .family_name()
            .to_string();

        let mut registry = FontRegistry::empty();
        registry.db.load_font_data(data);
        // Point sans-serif at a family that is not installed
        registry.db.set_sans_serif_family("Not Installed Sans");

        let face = registry
            .resolve("Mrs Saint Delafield Missing")
            .expect("any loaded face is a valid fallback");
        assert_eq!(face.family_name(), family);

        let metrics = registry
            .measure_raster("Ada", "Another Missing Family", 40.0)
            .expect("measure with fallback face");
        assert!(metrics.width > 0.0);
    }

    #[test]
    fn test_measure_raster_uses_resolved_face() {
        let mut registry = FontRegistry::empty();
        registry.register("Borel", Arc::new(BoxFont::named("Borel")));
        let metrics = registry.measure_raster("Ada", "Borel", 40.0).expect("measure");
        assert_eq!(metrics.width, 60.0);
    }
}
