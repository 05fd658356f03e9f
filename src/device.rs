use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use nix::ioctl_readwrite;
use tracing::info;

use crate::error::{PrinterError, classify, classify_open};
use crate::op::{Margins, NpOp, OpCode, Request, Resolution, decode_paper_size, decode_status};
use crate::status::{PaperSize, StatusReport};

/// Well-known control node for the printer.
pub const PRINTER_DEV: &str = "/dev/np0";

/// Pause between power-off and power-on during a reset, long enough for the
/// engine to fully de-energize.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

ioctl_readwrite!(np_pop, b'p', 1, NpOp);

/// One blocking request/response exchange with the device driver.
///
/// The call carries no timeout; a hung device hangs the caller. That is the
/// device contract, not something this layer papers over.
pub trait ControlPort {
    /// Issue the control call, filling `record` in place with the response.
    /// On failure returns the raw errno reported by the driver.
    fn pop(&mut self, record: &mut NpOp) -> Result<(), i32>;
}

/// Acquires a live [`ControlPort`] for a single adapter operation.
pub trait PortOpener {
    type Port: ControlPort;

    /// Open the control node read/write. `op_name` is the operation the
    /// port is being acquired for, carried into any failure.
    fn open_port(&self, op_name: &'static str) -> Result<Self::Port, PrinterError>;
}

/// Live connection to the control node, exclusive per open: the driver
/// reports busy to a second opener. Closed when dropped.
pub struct DevNode {
    file: File,
}

impl ControlPort for DevNode {
    fn pop(&mut self, record: &mut NpOp) -> Result<(), i32> {
        // SAFETY: the fd is an open printer control node and NpOp matches
        // the driver's record layout.
        match unsafe { np_pop(self.file.as_raw_fd(), record) } {
            Ok(_) => Ok(()),
            Err(errno) => Err(errno as i32),
        }
    }
}

/// Opens the printer's control node.
#[derive(Debug, Clone)]
pub struct NpOpener {
    path: PathBuf,
}

impl NpOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        NpOpener { path: path.into() }
    }
}

impl Default for NpOpener {
    fn default() -> Self {
        NpOpener::new(PRINTER_DEV)
    }
}

impl PortOpener for NpOpener {
    type Port = DevNode;

    fn open_port(&self, op_name: &'static str) -> Result<DevNode, PrinterError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| classify_open(source, op_name))?;
        info!(path = %self.path.display(), "opened printer device");
        Ok(DevNode { file })
    }
}

/// Result of the two-call status query.
///
/// The status portion is mandatory. The paper size is read best-effort on
/// the same handle and carries its own classified error instead of
/// discarding an already-obtained status.
#[derive(Debug)]
pub struct StatusQuery {
    pub status: StatusReport,
    pub paper_size: Result<PaperSize, PrinterError>,
}

/// Protocol adapter over the printer's control node.
///
/// Every operation acquires its own port, performs one blocking control
/// call, and releases the port on every exit path. Mutual exclusion between
/// concurrent invocations is the device's job, surfaced as a busy error.
pub struct Printer<O: PortOpener = NpOpener> {
    opener: O,
}

impl Printer<NpOpener> {
    /// Adapter over the well-known control node.
    pub fn new() -> Self {
        Printer {
            opener: NpOpener::default(),
        }
    }
}

impl Default for Printer<NpOpener> {
    fn default() -> Self {
        Printer::new()
    }
}

impl<O: PortOpener> Printer<O> {
    pub fn with_opener(opener: O) -> Self {
        Printer { opener }
    }

    /// Acquire, encode, issue one control call, classify failure. The port
    /// is released when this frame returns, success or not.
    fn call(&self, request: Request) -> Result<NpOp, PrinterError> {
        let name = request.op_code().name();
        let mut port = self.opener.open_port(name)?;
        let mut record = request.encode();
        port.pop(&mut record)
            .map_err(|errno| classify(errno, name))?;
        Ok(record)
    }

    pub fn set_power(&self, on: bool) -> Result<(), PrinterError> {
        info!(on, "setting printer power");
        self.call(Request::SetPower { on }).map(drop)
    }

    /// Power-cycle the printer: off, settle, on. Never attempts power-on
    /// when power-off fails.
    pub fn reset_power(&self) -> Result<(), PrinterError> {
        self.set_power(false)?;
        thread::sleep(SETTLE_DELAY);
        self.set_power(true)
    }

    pub fn set_resolution(&self, resolution: Resolution) -> Result<(), PrinterError> {
        info!(dpi = resolution.dpi(), "setting print resolution");
        self.call(Request::SetResolution(resolution)).map(drop)
    }

    pub fn set_margins(&self, margins: Margins) -> Result<(), PrinterError> {
        info!(?margins, "setting page margins");
        self.call(Request::SetMargins(margins)).map(drop)
    }

    /// Read the condition mask, then the paper size on the same handle.
    pub fn query_status(&self) -> Result<StatusQuery, PrinterError> {
        let name = OpCode::GetStatus.name();
        let mut port = self.opener.open_port(name)?;

        let mut record = Request::GetStatus.encode();
        port.pop(&mut record)
            .map_err(|errno| classify(errno, name))?;
        let (flags, retrans) = decode_status(&record);
        let status = StatusReport::decode(flags, retrans);
        info!("raw status flags {:#010x}", status.raw);

        let mut record = Request::GetPaperSize.encode();
        let paper_size = match port.pop(&mut record) {
            Ok(()) => Ok(PaperSize::from(decode_paper_size(&record))),
            Err(errno) => Err(classify(errno, OpCode::GetPaperSize.name())),
        };

        Ok(StatusQuery { status, paper_size })
    }
}
