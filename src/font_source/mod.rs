//! Font sources
//!
//! Everything that turns a style id into glyphs:
//! - `catalog`: style id to font configuration table
//! - `metrics`: the `GlyphSource` trait, parsed fonts and measurement
//! - `outline`: glyph outline extraction into kurbo paths
//! - `registry`: family-name resolution for the preview path

pub mod catalog;
pub mod metrics;
pub mod outline;
pub mod registry;

pub use catalog::{FontCatalog, StyleId, StyleSpec};
pub use metrics::{load_vector_font, measure, GlyphSource, LoadedFont, ShapedGlyph, TextMetrics};
pub use outline::{glyphs_path, text_path, OutlineSink};
pub use registry::FontRegistry;
