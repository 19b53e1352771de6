//! Core application functionality
//!
//! This module contains the core application logic, including:
//! - Command line handling and user configuration
//! - Error types
//! - The render session
//! - Process setup and the one-shot and interactive runners

pub mod cli;
pub mod config;
pub mod errors;
pub mod platform;
pub mod runner;
pub mod state;

// Re-export commonly used items
pub use cli::{CliArgs, ResolvedSettings};
pub use errors::{SignatureError, SignatureResult};
pub use runner::run_app;
pub use state::{ExportTicket, SignatureSession};
