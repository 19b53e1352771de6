//! Input and output plumbing
//!
//! - `delivery`: share-or-save of finished exports
//! - `input`: parsing of interactive input lines into session events

pub mod delivery;
pub mod input;

pub use delivery::{
    ClientKind, CommandShareTarget, Delivery, DeliveryOutcome, FileSaver, ShareTarget,
};
pub use input::{parse_line, InputEvent};
