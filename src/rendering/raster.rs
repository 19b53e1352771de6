//! Raster export
//!
//! Re-lays the name out at export size, draws it in black onto a surface
//! cropped to the text box plus padding, and encodes PNG or JPEG.

use crate::core::errors::{SignatureError, SignatureResult};
use crate::font_source::catalog::StyleSpec;
use crate::font_source::metrics::GlyphSource;
use crate::font_source::registry::FontRegistry;
use crate::rendering::artifact::{ExportArtifact, ExportFormat};
use crate::rendering::layout::export_layout;
use crate::rendering::surface::DrawingSurface;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use tiny_skia::Color;
use tracing::debug;

/// JPEG quality used for exports
pub const JPEG_QUALITY: u8 = 92;

/// Encodings the raster exporter can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl From<RasterFormat> for ExportFormat {
    fn from(format: RasterFormat) -> Self {
        match format {
            RasterFormat::Png => ExportFormat::Png,
            RasterFormat::Jpeg => ExportFormat::Jpeg,
        }
    }
}

impl ExportFormat {
    /// The raster encoding for this format, `None` for SVG
    pub fn raster(&self) -> Option<RasterFormat> {
        match self {
            ExportFormat::Png => Some(RasterFormat::Png),
            ExportFormat::Jpeg => Some(RasterFormat::Jpeg),
            ExportFormat::Svg => None,
        }
    }
}

/// Export `name` in the style's display family. An empty name exports
/// nothing.
pub fn export_raster(
    name: &str,
    spec: &StyleSpec,
    format: RasterFormat,
    registry: &mut FontRegistry,
) -> SignatureResult<Option<ExportArtifact>> {
    if name.is_empty() {
        debug!("Skipping {:?} export: name is empty", format);
        return Ok(None);
    }
    let font = registry.resolve(&spec.display_family)?;
    render_raster(name, spec, format, font.as_ref())
}

/// Export `name` using an already resolved face
pub fn render_raster(
    name: &str,
    spec: &StyleSpec,
    format: RasterFormat,
    font: &dyn GlyphSource,
) -> SignatureResult<Option<ExportArtifact>> {
    let Some(layout) = export_layout(name, spec, font, false) else {
        return Ok(None);
    };
    let (width, height) = layout.export_size();

    // JPEG has no alpha channel, so it gets an opaque white page
    let mut surface = match format {
        RasterFormat::Png => DrawingSurface::new(width, height)?,
        RasterFormat::Jpeg => DrawingSurface::with_background(width, height, Color::WHITE)?,
    };
    surface.draw_text(
        font,
        name,
        layout.effective_font_size,
        layout.origin_x,
        layout.origin_y,
    );

    let bytes = match format {
        RasterFormat::Png => surface.encode_png()?,
        RasterFormat::Jpeg => encode_jpeg(&surface)?,
    };
    debug!(
        "Rendered {:?} export of {}x{} ({} bytes) with {}",
        format,
        width,
        height,
        bytes.len(),
        layout.effective_font_specifier
    );

    Ok(Some(ExportArtifact::new(bytes, format.into(), name)))
}

fn encode_jpeg(surface: &DrawingSurface) -> SignatureResult<Vec<u8>> {
    let rgba = RgbaImage::from_raw(surface.width(), surface.height(), surface.to_rgba())
        .ok_or_else(|| SignatureError::Encode("pixel buffer size mismatch".to_string()))?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| SignatureError::Encode(e.to_string()))?;
    Ok(bytes)
}
