//! Export formats and artifacts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base name used when there is no name to build a filename from
pub const FALLBACK_FILE_STEM: &str = "signature";

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Svg];

    /// Parse a format name or extension (`png`, `jpg`, `jpeg`, `svg`)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, ExportFormat::Svg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An encoded export, handed to delivery exactly once
#[derive(Debug)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub suggested_filename: String,
}

impl ExportArtifact {
    pub fn new(bytes: Vec<u8>, format: ExportFormat, name: &str) -> Self {
        Self {
            bytes,
            mime_type: format.mime_type(),
            suggested_filename: suggested_filename(name, format),
        }
    }
}

/// `<name>.<ext>`, or `signature.<ext>` for an empty name.
///
/// Path separators and control characters are replaced with `_` so the
/// result is always a single file name.
pub fn suggested_filename(name: &str, format: ExportFormat) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let stem = match stem.as_str() {
        "" | "." | ".." => FALLBACK_FILE_STEM,
        other => other,
    };
    format!("{}.{}", stem, format.extension())
}
