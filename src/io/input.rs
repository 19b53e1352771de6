//! Interactive input parsing
//!
//! Each stdin line becomes one [`InputEvent`]. Plain lines replace the name;
//! lines starting with `:` are commands. A leading `::` escapes a name that
//! itself starts with a colon.

use crate::font_source::catalog::StyleId;
use crate::rendering::artifact::ExportFormat;
use std::path::PathBuf;

/// Something the user did
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    SetName(String),
    SetStyle(StyleId),
    Export(ExportFormat),
    /// Write the current preview surface as PNG
    Preview(PathBuf),
    ListStyles,
    Help,
    Quit,
    /// A command that could not be understood, with the reason
    Invalid(String),
}

/// Help text for interactive mode
pub const INTERACTIVE_HELP: &str = "\
Type a name to preview it. Commands:
  :style <elegant|bold|casual|random>   change the style
  :export <png|jpg|svg>                 export the current name
  :preview <file.png>                   write the preview canvas
  :styles                               list styles
  :help                                 show this help
  :quit                                 exit";

pub fn parse_line(line: &str) -> InputEvent {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(escaped) = line.strip_prefix("::") {
        return InputEvent::SetName(format!(":{escaped}"));
    }
    let Some(command) = line.strip_prefix(':') else {
        return InputEvent::SetName(line.to_string());
    };

    let mut parts = command.trim().splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match verb.as_str() {
        "style" | "s" if !arg.is_empty() => InputEvent::SetStyle(StyleId::parse(arg)),
        "style" | "s" => InputEvent::Invalid("usage: :style <name>".to_string()),
        "export" | "e" => match ExportFormat::parse(arg) {
            Some(format) => InputEvent::Export(format),
            None => InputEvent::Invalid(format!("unknown export format '{arg}'")),
        },
        "preview" | "p" if !arg.is_empty() => InputEvent::Preview(PathBuf::from(arg)),
        "preview" | "p" => InputEvent::Invalid("usage: :preview <file.png>".to_string()),
        "styles" => InputEvent::ListStyles,
        "help" | "h" | "?" => InputEvent::Help,
        "quit" | "q" | "exit" => InputEvent::Quit,
        other => InputEvent::Invalid(format!("unknown command ':{other}'")),
    }
}
