//! Application state management.
//!
//! The only long-lived state is the render session: current input plus the
//! preview surface it was drawn onto.

pub mod session;

pub use session::{run_vector_export, ExportTicket, SignatureSession};
