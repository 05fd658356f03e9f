use std::io;

use nix::errno::Errno;
use nix::libc::{EBUSY, EIO, ENXIO};
use thiserror::Error;

/// Errno reported by the driver when content is written before margins have
/// been established. The libc bindings carry no name for it.
pub const ENOINIT: i32 = 66;

/// Errno reported by the driver when the engine is in an internal error
/// state.
pub const EDEVERR: i32 = 68;

/// The primary error type for the `npctl` library.
///
/// Constructed only by [`classify`] and [`classify_open`]; every variant
/// names the operation that failed.
#[derive(Error, Debug)]
pub enum PrinterError {
    #[error("{op}: cannot open printer device: {source}")]
    DeviceUnavailable {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{op}: margins not set before write")]
    MarginsNotSet { op: &'static str },

    #[error("{op}: printer is in error state")]
    DeviceError { op: &'static str },

    #[error("{op}: unknown command or device")]
    UnsupportedOperation { op: &'static str },

    #[error("{op}: I/O error talking to printer")]
    IoFailure { op: &'static str },

    #[error("{op}: printer already in use")]
    DeviceBusy { op: &'static str },

    #[error("{op}: {message}")]
    SystemFailure { op: &'static str, message: String },
}

/// Map a failing control call's errno to its domain error.
///
/// Pure and total: unrecognized values become [`PrinterError::SystemFailure`]
/// carrying the system's description of the errno.
pub fn classify(errno: i32, op: &'static str) -> PrinterError {
    match errno {
        ENOINIT => PrinterError::MarginsNotSet { op },
        EDEVERR => PrinterError::DeviceError { op },
        ENXIO => PrinterError::UnsupportedOperation { op },
        EIO => PrinterError::IoFailure { op },
        EBUSY => PrinterError::DeviceBusy { op },
        other => PrinterError::SystemFailure {
            op,
            message: Errno::from_raw(other).desc().to_string(),
        },
    }
}

/// Classify a failed open of the control node.
///
/// Recognized driver errnos keep their usual kinds (a busy printer is busy
/// whether open or the control call reports it); anything else means the
/// node itself is unavailable.
pub fn classify_open(source: io::Error, op: &'static str) -> PrinterError {
    match source.raw_os_error() {
        Some(code @ (ENOINIT | EDEVERR | ENXIO | EIO | EBUSY)) => classify(code, op),
        _ => PrinterError::DeviceUnavailable { op, source },
    }
}
