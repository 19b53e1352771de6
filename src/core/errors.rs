//! Error types for rendering and export
//!
//! Library code returns [`SignatureError`]; the binary wraps it in
//! `anyhow::Error` at the application boundary.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while drawing, exporting or delivering a signature
#[derive(Error, Debug)]
pub enum SignatureError {
    /// No drawing surface or no font face to measure with. Fatal for the
    /// current frame only.
    #[error("Render surface unavailable: {0}")]
    RenderSurfaceUnavailable(String),

    /// The vector font file is missing or cannot be parsed.
    #[error("Failed to load font {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },

    /// The native share surface refused the artifact (user cancel included).
    #[error("Share cancelled or failed: {0}")]
    ShareCancelledOrFailed(String),

    /// Image or document encoding failed
    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignatureError {
    pub fn font_load(path: &Path, reason: impl ToString) -> Self {
        Self::FontLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error leaves the preview usable and only aborts one export
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::RenderSurfaceUnavailable(_))
    }
}

pub type SignatureResult<T> = Result<T, SignatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_load_message_names_the_path() {
        let err = SignatureError::font_load(Path::new("fonts/Borel-Regular.ttf"), "not found");
        let message = err.to_string();
        assert!(message.contains("fonts/Borel-Regular.ttf"));
        assert!(message.contains("not found"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_surface_errors_are_fatal_for_the_frame() {
        let err = SignatureError::RenderSurfaceUnavailable("0x0 canvas".to_string());
        assert!(!err.is_recoverable());
    }
}
