//! Command line interface for siggen
//!
//! Handles parsing command line arguments and provides validation for user
//! inputs. Settings that can also live in the config file are resolved here,
//! with the command line taking priority.

use crate::core::config::ConfigFile;
use crate::font_source::catalog::StyleId;
use crate::io::delivery::ClientKind;
use crate::rendering::artifact::ExportFormat;
use crate::rendering::surface::PREVIEW_CANVAS_SIZE;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::debug;

/// Default directory holding one font file per style
pub const DEFAULT_FONTS_DIR: &str = "fonts";

/// siggen CLI arguments
///
/// Examples:
///   siggen "Ada Lovelace"                        # Preview only (nothing saved)
///   siggen "Ada Lovelace" -f png                 # Export Ada Lovelace.png
///   siggen "Ada" --style casual -f png -f svg    # PNG and SVG in the Borel face
///   siggen "Ada" --preview preview.png           # Write the preview canvas
///   siggen --interactive                         # Type names, see them redrawn
///   siggen --list-styles                         # Show the style catalog
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "siggen",
    version,
    about = "Render a name as a handwritten signature",
    long_about = "siggen renders a name in one of several handwriting fonts, centers it on a preview canvas, and exports it as PNG, JPEG or SVG. Exported images are cropped to the text plus a 20 pixel margin."
)]
pub struct CliArgs {
    /// Name to render
    #[clap(
        value_name = "NAME",
        help = "Name to render",
        long_help = "Name to render. An empty name draws nothing and skips every export."
    )]
    pub name: Option<String>,

    /// Style to render with
    ///
    /// Available styles: elegant, bold, casual, random (default).
    #[clap(
        long = "style",
        short = 's',
        help = "Signature style",
        long_help = "Signature style. Available styles: elegant, bold, casual, random. The random style picks a catalog font, a size between 30 and 50 pixels and a small offset on every render."
    )]
    pub style: Option<String>,

    /// Formats to export, in order
    #[clap(
        long = "format",
        short = 'f',
        action = ArgAction::Append,
        help = "Export format (png, jpg, svg); repeatable",
        long_help = "Export format. Accepts png, jpg, jpeg or svg and may be given more than once. Each format produces one file named after the signature."
    )]
    pub formats: Vec<String>,

    /// Directory exported files are saved to
    #[clap(
        long = "output",
        short = 'o',
        help = "Directory to save exports in",
        long_help = "Directory to save exports in. Defaults to the output_dir config setting, then the current directory."
    )]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the style font files
    #[clap(
        long = "fonts-dir",
        help = "Directory holding the style font files",
        long_help = "Directory holding one .ttf file per style (MrsSaintDelafield-Regular.ttf, Yesteryear-Regular.ttf, Borel-Regular.ttf). The SVG exporter reads these files directly; the preview finds the families through the same directory or the system fonts."
    )]
    pub fonts_dir: Option<PathBuf>,

    /// Write the preview canvas to a PNG file
    #[clap(
        long = "preview",
        value_name = "FILE",
        help = "Write the preview canvas as PNG"
    )]
    pub preview: Option<PathBuf>,

    /// Multiplier applied to the style size for exports
    #[clap(
        long = "export-scale",
        help = "Scale factor for exported images",
        long_help = "Scale factor applied to the style's font size when exporting. 2.0 doubles the resolution of PNG and JPEG exports. Defaults to 1.0."
    )]
    pub export_scale: Option<f32>,

    /// Client kind used for delivery
    #[clap(
        long = "client",
        value_enum,
        help = "Client kind (desktop saves, mobile shares first)",
        long_help = "Client kind. Desktop clients always save exports to disk. Mobile clients offer each export to the share command first and save it if sharing fails or is cancelled."
    )]
    pub client: Option<ClientKind>,

    /// Read names and commands from stdin
    #[clap(
        long = "interactive",
        short = 'i',
        help = "Read names and commands from stdin",
        long_help = "Interactive mode. Each line typed replaces the name and redraws the preview. Lines starting with ':' are commands; type :help for the list."
    )]
    pub interactive: bool,

    /// Print the style catalog and exit
    #[clap(long = "list-styles", help = "List available styles and exit")]
    pub list_styles: bool,

    /// Initialize user configuration directory
    ///
    /// This creates the ~/.config/siggen directory with a settings.json file
    /// and a logs/ directory.
    #[clap(
        long = "new-config",
        help = "Initialize user config directory",
        long_help = "Initialize the ~/.config/siggen directory with a settings.json file holding the default settings, and a logs/ directory. Edit settings.json to change defaults without command line arguments."
    )]
    pub new_config: bool,

    /// Increase log verbosity
    #[clap(
        long = "verbose",
        short = 'v',
        action = ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)",
        long_help = "Increase log verbosity. -v shows info, -vv debug and -vvv trace messages. RUST_LOG overrides this flag."
    )]
    pub verbose: u8,

    /// Also write logs to ~/.config/siggen/logs/
    #[clap(
        long = "log-file",
        help = "Also write logs to the config logs directory",
        long_help = "Also write logs to ~/.config/siggen/logs/siggen-YYYY-MM-DD.log."
    )]
    pub log_file: bool,
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    ///
    /// Catches typos in style and format names before anything is drawn.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(style) = &self.style {
            if StyleId::try_parse(style).is_none() {
                let available_styles = StyleId::all_names().join(", ");
                return Err(format!(
                    "Unknown style: '{style}'\nAvailable styles: {available_styles}"
                ));
            }
        }

        for format in &self.formats {
            if ExportFormat::parse(format).is_none() {
                return Err(format!(
                    "Unknown export format: '{format}'\nAvailable formats: png, jpg, svg"
                ));
            }
        }

        if let Some(scale) = self.export_scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(format!(
                    "Invalid export scale: {scale}\nThe export scale must be a positive number."
                ));
            }
        }

        if let Some(dir) = &self.fonts_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "Fonts directory does not exist: {}\nMake sure the path is correct.",
                    dir.display()
                ));
            }
        }

        if self.name.is_some() && self.interactive {
            return Err(
                "A name cannot be combined with --interactive\nType the name at the prompt instead."
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Parsed export formats, in the order given
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        self.formats
            .iter()
            .filter_map(|format| ExportFormat::parse(format))
            .collect()
    }

    /// Resolve all settings against the user config file
    pub fn resolve(&self) -> ResolvedSettings {
        self.resolve_with(ConfigFile::load().unwrap_or_default())
    }

    /// Resolve all settings against `config`
    ///
    /// Priority order:
    /// 1. CLI argument
    /// 2. Config file setting (~/.config/siggen/settings.json)
    /// 3. Built-in default
    pub fn resolve_with(&self, config: ConfigFile) -> ResolvedSettings {
        let style = self.get_style(&config);

        let fonts_dir = self
            .fonts_dir
            .clone()
            .or(config.fonts_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FONTS_DIR));
        let output_dir = self
            .output_dir
            .clone()
            .or(config.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let export_scale = self.export_scale.or(config.export_scale).unwrap_or(1.0);
        let client = self.client.or(config.client).unwrap_or_default();

        let (default_width, default_height) = PREVIEW_CANVAS_SIZE;
        let canvas_width = config.canvas_width.unwrap_or(default_width);
        let canvas_height = config.canvas_height.unwrap_or(default_height);

        ResolvedSettings {
            style,
            fonts_dir,
            output_dir,
            export_scale,
            client,
            share_command: config.share_command.unwrap_or_default(),
            canvas_width,
            canvas_height,
        }
    }

    /// Get the style from CLI args, config file, or default
    fn get_style(&self, config: &ConfigFile) -> StyleId {
        if let Some(style) = self.style.as_deref().and_then(StyleId::try_parse) {
            debug!("Using style from CLI: {}", style);
            return style;
        }

        if let Some(style) = config.default_style.as_deref().and_then(StyleId::try_parse) {
            debug!("Using style from config file: {}", style);
            return style;
        }

        debug!("Using default style: {}", StyleId::default());
        StyleId::default()
    }
}

/// Settings after merging CLI arguments, config file and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub style: StyleId,
    pub fonts_dir: PathBuf,
    pub output_dir: PathBuf,
    pub export_scale: f32,
    pub client: ClientKind,
    /// Share command split into words; empty when sharing is not configured
    pub share_command: Vec<String>,
    pub canvas_width: u32,
    pub canvas_height: u32,
}
