//! Application runner logic
//!
//! Handles the different ways to run siggen: one-shot rendering of a name
//! given on the command line, and the interactive stdin loop.

use crate::core::cli::{CliArgs, ResolvedSettings};
use crate::core::config::ConfigFile;
use crate::core::errors::{SignatureError, SignatureResult};
use crate::core::state::{run_vector_export, ExportTicket, SignatureSession};
use crate::font_source::catalog::{FontCatalog, StyleId};
use crate::font_source::registry::FontRegistry;
use crate::io::delivery::{CommandShareTarget, Delivery, DeliveryOutcome, FileSaver};
use crate::io::input::{parse_line, InputEvent, INTERACTIVE_HELP};
use crate::logging;
use crate::rendering::artifact::{ExportArtifact, ExportFormat};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

type VectorResult = (ExportTicket, SignatureResult<Option<ExportArtifact>>);

/// Create and run the application with the given CLI arguments.
/// Handles special CLI flags and delegates to appropriate runners.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    // Handle --new-config flag specially
    if cli_args.new_config {
        return ConfigFile::initialize_config_directory()
            .context("Failed to initialize config directory");
    }

    cli_args.validate().map_err(anyhow::Error::msg)?;
    // Held until return so the log file is flushed
    let _log_guard = logging::init(cli_args.verbose, cli_args.log_file)?;

    let settings = cli_args.resolve();
    debug!("Resolved settings: {:?}", settings);

    let mut stdout = std::io::stdout();
    if cli_args.list_styles {
        let catalog = FontCatalog::new(&settings.fonts_dir, settings.export_scale);
        print_styles(&catalog, &mut stdout)?;
        return Ok(());
    }

    let mut session = build_session(&settings).context("Failed to set up the preview")?;
    let delivery = build_delivery(&settings);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    if cli_args.interactive {
        let stdin = BufReader::new(tokio::io::stdin());
        runtime.block_on(run_interactive(&mut session, &delivery, stdin, &mut stdout))
    } else {
        let name = cli_args.name.clone().unwrap_or_default();
        runtime.block_on(run_once(
            &mut session,
            &delivery,
            &name,
            &cli_args.export_formats(),
            cli_args.preview.as_deref(),
            &mut stdout,
        ))
    }
}

/// Build the session for the resolved settings, with the configured style
/// already selected.
pub fn build_session(settings: &ResolvedSettings) -> SignatureResult<SignatureSession> {
    let catalog = FontCatalog::new(&settings.fonts_dir, settings.export_scale);
    let registry = FontRegistry::with_fonts_dir(&settings.fonts_dir);
    let mut session =
        SignatureSession::new(catalog, registry, settings.canvas_width, settings.canvas_height)?;
    session.set_style(settings.style)?;
    Ok(session)
}

/// Build the delivery policy for the resolved settings
pub fn build_delivery(settings: &ResolvedSettings) -> Delivery {
    let delivery = Delivery::new(settings.client, FileSaver::new(&settings.output_dir));
    match CommandShareTarget::from_command(&settings.share_command) {
        Some(target) => delivery.with_share_target(Box::new(target)),
        None => delivery,
    }
}

/// Render `name` once, optionally write the preview, then run every export
/// in order. Returns an error if any export failed.
pub async fn run_once(
    session: &mut SignatureSession,
    delivery: &Delivery,
    name: &str,
    formats: &[ExportFormat],
    preview: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    if let Err(e) = session.set_name(name) {
        error!("Preview aborted: {e}");
        eprintln!("{e}");
    }

    if let Some(path) = preview {
        session
            .write_preview(path)
            .with_context(|| format!("Failed to write preview to {}", path.display()))?;
        writeln!(out, "Preview written to {}", path.display())?;
    }

    if name.is_empty() && !formats.is_empty() {
        writeln!(out, "Nothing to export: the name is empty")?;
        return Ok(());
    }

    let mut failures = 0;
    for &format in formats {
        let result = match format.raster() {
            Some(raster) => session.export_raster(raster),
            None => match session.vector_ticket() {
                Some(ticket) => finish_vector_export(session, run_vector_export(ticket).await),
                None => Ok(None),
            },
        };
        if !deliver_result(session, delivery, format, result, out)? {
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} exports failed", formats.len());
    }
    Ok(())
}

/// Read names and commands from `input` until `:quit` or end of input.
///
/// Vector exports run as spawned tasks while input keeps flowing; their
/// results are checked against the name at completion time. Pending exports
/// are awaited before returning.
pub async fn run_interactive<R>(
    session: &mut SignatureSession,
    delivery: &Delivery,
    input: R,
    out: &mut dyn Write,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    writeln!(out, "{INTERACTIVE_HELP}")?;
    writeln!(out, "Style: {}", session.style().display_name())?;

    let (tx, mut rx) = mpsc::unbounded_channel::<VectorResult>();
    let mut lines = input.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_line(&line) {
                    InputEvent::Quit => break,
                    InputEvent::Export(ExportFormat::Svg) => match session.vector_ticket() {
                        Some(ticket) => {
                            debug!("Starting SVG export for '{}' (revision {})", ticket.name, ticket.revision);
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                // The receiver only goes away once the loop is done draining
                                let _ = tx.send(run_vector_export(ticket).await);
                            });
                        }
                        None => writeln!(out, "Nothing to export: the name is empty")?,
                    },
                    event => handle_event(session, delivery, event, out)?,
                }
            }
            Some(finished) = rx.recv() => {
                let result = finish_vector_export(session, finished);
                deliver_result(session, delivery, ExportFormat::Svg, result, out)?;
            }
        }
    }

    drop(tx);
    while let Some(finished) = rx.recv().await {
        let result = finish_vector_export(session, finished);
        deliver_result(session, delivery, ExportFormat::Svg, result, out)?;
    }
    Ok(())
}

fn handle_event(
    session: &mut SignatureSession,
    delivery: &Delivery,
    event: InputEvent,
    out: &mut dyn Write,
) -> Result<()> {
    match event {
        InputEvent::SetName(name) => match session.set_name(name) {
            Ok(Some(layout)) => writeln!(
                out,
                "{} in {} at ({:.1}, {:.1}), {:.1}px wide",
                session.name(),
                layout.effective_font_specifier,
                layout.origin_x,
                layout.origin_y,
                layout.text_width
            )?,
            Ok(None) => writeln!(out, "(cleared)")?,
            Err(e) => report_frame_error(&e, out)?,
        },
        InputEvent::SetStyle(style) => {
            if let Err(e) = session.set_style(style) {
                report_frame_error(&e, out)?;
            }
            writeln!(out, "Style: {}", style.display_name())?;
        }
        InputEvent::Export(format) => {
            if session.name().is_empty() {
                writeln!(out, "Nothing to export: the name is empty")?;
            } else if let Some(raster) = format.raster() {
                let result = session.export_raster(raster);
                deliver_result(session, delivery, format, result, out)?;
            }
        }
        InputEvent::Preview(path) => match session.write_preview(&path) {
            Ok(()) => writeln!(out, "Preview written to {}", path.display())?,
            Err(e) => writeln!(out, "Failed to write preview: {e}")?,
        },
        InputEvent::ListStyles => print_styles(session.catalog(), out)?,
        InputEvent::Help => writeln!(out, "{INTERACTIVE_HELP}")?,
        InputEvent::Invalid(reason) => writeln!(out, "{reason} (type :help for commands)")?,
        InputEvent::Quit => {}
    }
    Ok(())
}

/// A failed redraw leaves the preview blank; the session carries on
fn report_frame_error(e: &SignatureError, out: &mut dyn Write) -> Result<()> {
    error!("Preview aborted: {e}");
    writeln!(out, "Preview aborted: {e}")?;
    Ok(())
}

/// Drop a finished vector export whose name no longer matches the session
fn finish_vector_export(
    session: &SignatureSession,
    (ticket, result): VectorResult,
) -> SignatureResult<Option<ExportArtifact>> {
    if session.accepts(&ticket) {
        return result;
    }
    info!(
        "Discarding SVG export for '{}' (revision {}): the name is now '{}' (revision {})",
        ticket.name,
        ticket.revision,
        session.name(),
        session.revision()
    );
    Ok(None)
}

/// Hand an export result to delivery and report the outcome.
///
/// Returns `false` when the export or its delivery failed.
fn deliver_result(
    session: &SignatureSession,
    delivery: &Delivery,
    format: ExportFormat,
    result: SignatureResult<Option<ExportArtifact>>,
    out: &mut dyn Write,
) -> Result<bool> {
    let artifact = match result {
        Ok(Some(artifact)) => artifact,
        Ok(None) => return Ok(true),
        Err(SignatureError::FontLoad { path, reason }) => {
            warn!("Font load failed for {}: {}", path.display(), reason);
            eprintln!("{}", font_load_notice(session.catalog().fonts_dir()));
            return Ok(false);
        }
        Err(e) => {
            error!("{} export failed: {}", format, e);
            eprintln!("Failed to export {format}: {e}");
            return Ok(false);
        }
    };

    match delivery.deliver(artifact) {
        Ok(DeliveryOutcome::Shared) => writeln!(out, "Shared {format} export")?,
        Ok(DeliveryOutcome::Saved(path)) => writeln!(out, "Saved {}", path.display())?,
        Err(e) => {
            error!("Saving {} export failed: {}", format, e);
            eprintln!("Failed to save {format} export: {e}");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Message shown when the SVG exporter cannot load its font file
pub fn font_load_notice(fonts_dir: &Path) -> String {
    format!(
        "Failed to generate SVG. Make sure font files are available in {}.",
        display_dir(fonts_dir).display()
    )
}

fn display_dir(dir: &Path) -> PathBuf {
    let mut dir = dir.to_path_buf();
    dir.push("");
    dir
}

fn print_styles(catalog: &FontCatalog, out: &mut dyn Write) -> Result<()> {
    for style in StyleId::ALL {
        if style == StyleId::Random {
            writeln!(out, "{:<8} any of the above, 30-50px, jittered", style.as_str())?;
            continue;
        }
        let spec = catalog.spec_for(style);
        writeln!(
            out,
            "{:<8} {:<24} {}",
            style.as_str(),
            spec.font_specifier(spec.display_size_px),
            spec.vector_font_path.display()
        )?;
    }
    Ok(())
}
