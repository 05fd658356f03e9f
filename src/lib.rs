//! Control library for the N2000 laser printer's character device.
//!
//! The printer is driven through a single control node that accepts a
//! fixed-layout operation record per request. This crate encodes typed
//! operations into that record, performs the blocking control call, and
//! decodes status and failure information into inspectable types.

pub mod device;
pub mod error;
pub mod op;
pub mod status;

// Re-export the adapter surface for easy access
pub use device::{PRINTER_DEV, Printer, StatusQuery};
pub use error::PrinterError;
