//! siggen
//!
//! Renders a name as a handwritten signature, previews it on a canvas and
//! exports it as PNG, JPEG or SVG.
pub mod core;
pub mod font_source;
pub mod io;
pub mod logging;
pub mod rendering;
