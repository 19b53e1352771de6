//! Render session state
//!
//! A [`SignatureSession`] owns the current name and style, the font
//! catalog and registry, and the visible preview surface. Every name or
//! style change clears the surface and redraws it from scratch.
//!
//! Vector exports run outside the session. They start from an
//! [`ExportTicket`] snapshot and the session decides on completion whether
//! the result still matches what the user is looking at.

use crate::core::errors::SignatureResult;
use crate::font_source::catalog::{FontCatalog, StyleId, StyleSpec};
use crate::font_source::registry::FontRegistry;
use crate::rendering::artifact::ExportArtifact;
use crate::rendering::layout::{layout, LayoutResult};
use crate::rendering::raster::{export_raster, RasterFormat};
use crate::rendering::surface::DrawingSurface;
use crate::rendering::vector::export_vector;
use std::path::Path;
use tracing::debug;

/// Snapshot of the input a vector export was started from
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTicket {
    pub name: String,
    pub spec: StyleSpec,
    /// Input revision at the time the export started
    pub revision: u64,
}

/// The preview and the input that produced it
pub struct SignatureSession {
    catalog: FontCatalog,
    registry: FontRegistry,
    surface: DrawingSurface,
    name: String,
    style: StyleId,
    /// Bumped on every name or style change
    revision: u64,
    last_layout: Option<LayoutResult>,
}

impl SignatureSession {
    /// Create a session with a blank preview canvas of the given size
    pub fn new(
        catalog: FontCatalog,
        registry: FontRegistry,
        canvas_width: u32,
        canvas_height: u32,
    ) -> SignatureResult<Self> {
        Ok(Self {
            catalog,
            registry,
            surface: DrawingSurface::new(canvas_width, canvas_height)?,
            name: String::new(),
            style: StyleId::default(),
            revision: 0,
            last_layout: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> StyleId {
        self.style
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    /// Layout of the current preview, `None` while the name is empty
    pub fn last_layout(&self) -> Option<&LayoutResult> {
        self.last_layout.as_ref()
    }

    /// Replace the name and redraw. Setting the same name again is a no-op.
    pub fn set_name(&mut self, name: impl Into<String>) -> SignatureResult<Option<LayoutResult>> {
        let name = name.into();
        if name == self.name {
            return Ok(self.last_layout.clone());
        }
        self.name = name;
        self.revision += 1;
        self.redraw()
    }

    /// Change the style and redraw. Setting the same style again is a no-op.
    pub fn set_style(&mut self, style: StyleId) -> SignatureResult<Option<LayoutResult>> {
        if style == self.style {
            return Ok(self.last_layout.clone());
        }
        self.style = style;
        self.revision += 1;
        self.redraw()
    }

    /// Clear the surface and draw the current name onto it.
    ///
    /// On error the surface stays cleared and the frame is dropped.
    pub fn redraw(&mut self) -> SignatureResult<Option<LayoutResult>> {
        self.surface.clear();
        self.last_layout = None;

        if self.name.is_empty() {
            return Ok(None);
        }

        let spec = self.catalog.spec_for(self.style);
        let font = self.registry.resolve(&spec.display_family)?;
        let Some(result) = layout(
            &self.name,
            &spec,
            font.as_ref(),
            self.surface.width() as f32,
            self.surface.height() as f32,
        ) else {
            return Ok(None);
        };

        self.surface.draw_text(
            font.as_ref(),
            &self.name,
            result.effective_font_size,
            result.origin_x,
            result.origin_y,
        );
        debug!(
            "Preview '{}' in {} at ({:.1}, {:.1})",
            self.name, result.effective_font_specifier, result.origin_x, result.origin_y
        );

        self.last_layout = Some(result.clone());
        Ok(Some(result))
    }

    /// Export the current name as PNG or JPEG. Empty names export nothing.
    pub fn export_raster(&mut self, format: RasterFormat) -> SignatureResult<Option<ExportArtifact>> {
        let spec = self.catalog.spec_for(self.style);
        export_raster(&self.name, &spec, format, &mut self.registry)
    }

    /// Snapshot the input for a vector export, `None` while the name is empty
    pub fn vector_ticket(&self) -> Option<ExportTicket> {
        if self.name.is_empty() {
            return None;
        }
        Some(ExportTicket {
            name: self.name.clone(),
            spec: self.catalog.spec_for(self.style),
            revision: self.revision,
        })
    }

    /// Whether a finished export for `ticket` should still be delivered.
    ///
    /// Only the name decides: the name must be non-empty and unchanged. A
    /// style change while the export is pending still delivers the artifact
    /// in the style the user exported. `ticket.revision` only identifies the
    /// snapshot in logs.
    pub fn accepts(&self, ticket: &ExportTicket) -> bool {
        !self.name.is_empty() && self.name == ticket.name
    }

    /// Write the preview surface as PNG
    pub fn write_preview(&self, path: &Path) -> SignatureResult<()> {
        let bytes = self.surface.encode_png()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        debug!("Wrote preview to {}", path.display());
        Ok(())
    }
}

/// Run the vector export described by `ticket`, handing the ticket back with
/// the result so the caller can validate it against the current input.
pub async fn run_vector_export(
    ticket: ExportTicket,
) -> (ExportTicket, SignatureResult<Option<ExportArtifact>>) {
    let result = export_vector(&ticket.name, &ticket.spec).await;
    (ticket, result)
}
