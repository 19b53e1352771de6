//! Rendering
//!
//! Layout, the preview surface, and the raster and vector exporters.

pub mod artifact;
pub mod layout;
pub mod raster;
pub mod surface;
pub mod vector;

pub use artifact::{suggested_filename, ExportArtifact, ExportFormat};
pub use layout::{export_bounds, export_layout, layout, LayoutResult, EXPORT_PADDING};
pub use raster::{export_raster, render_raster, RasterFormat};
pub use surface::{DrawingSurface, PREVIEW_CANVAS_SIZE};
pub use vector::{export_vector, render_svg};
