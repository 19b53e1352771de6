//! Platform-specific functionality and error handling.
//!
//! This module provides the process-level glue around the runner:
//! panic reporting, error reporting and argument parsing.

/// Initialize panic handling.
///
/// Panics are logged through tracing before the default hook prints them,
/// so they also land in the log file when one is active.
pub fn init_panic_handling() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("siggen panicked: {info}");
        default_hook(info);
    }));
}

/// Handle application errors: prints to stderr and exits with code 1
pub fn handle_error(error: anyhow::Error) {
    eprintln!();
    eprintln!("Error running siggen:");
    eprintln!("{error:#}");
    eprintln!();
    eprintln!("Try running with --help for usage information.");
    std::process::exit(1);
}

/// Parse command line arguments
pub fn get_cli_args() -> crate::core::cli::CliArgs {
    use clap::Parser;
    crate::core::cli::CliArgs::parse()
}
