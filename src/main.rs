use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use npctl::op::{Margins, Resolution};
use npctl::{Printer, StatusQuery};

/// Control utility for the N2000 laser printer.
#[derive(Parser, Debug)]
#[command(name = "npctl", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Power the printer on
    On,
    /// Power the printer off
    Off,
    /// Power-cycle the printer with a settle delay
    Reset,
    /// Show printer status and paper size
    Status,
    /// Set the print resolution
    #[command(name = "setdpi")]
    SetDpi {
        /// Dots per inch, 300 or 400
        #[arg(value_parser = parse_dpi)]
        dpi: Resolution,
    },
    /// Set the page margins, in device units
    #[command(name = "setmargins")]
    SetMargins {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    },
    /// Spool a print-ready file to the print queue
    Print { file: PathBuf },
    /// Spool the built-in demo page
    Demo,
}

fn parse_dpi(s: &str) -> Result<Resolution, String> {
    let dpi: u32 = s.parse().map_err(|_| format!("invalid dpi value: {s}"))?;
    Resolution::from_dpi(dpi).ok_or_else(|| "only 300 and 400 DPI are supported".to_string())
}

fn setup_logging(verbosity: &Verbosity<WarnLevel>) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors exit 1; --help and --version exit 0.
            let code = u8::from(err.use_stderr());
            let _ = err.print();
            return ExitCode::from(code);
        }
    };
    setup_logging(&cli.verbose);

    if !nix::unistd::geteuid().is_root() {
        warn!("not running as root; the control calls may be refused");
    }

    let printer = Printer::new();
    let (result, failure_code) = match cli.command {
        Cmd::On => (printer.set_power(true).map_err(anyhow::Error::new), 2),
        Cmd::Off => (printer.set_power(false).map_err(anyhow::Error::new), 3),
        Cmd::Reset => (printer.reset_power().map_err(anyhow::Error::new), 8),
        Cmd::Status => (show_status(&printer), 4),
        Cmd::SetDpi { dpi } => (printer.set_resolution(dpi).map_err(anyhow::Error::new), 5),
        Cmd::SetMargins {
            left,
            top,
            width,
            height,
        } => {
            let margins = Margins {
                left,
                top,
                width,
                height,
            };
            (printer.set_margins(margins).map_err(anyhow::Error::new), 6)
        }
        Cmd::Print { file } => (spool_file(&file), 7),
        Cmd::Demo => (spool_demo(), 9),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("npctl: {err:#}");
            ExitCode::from(failure_code)
        }
    }
}

fn show_status(printer: &Printer) -> Result<()> {
    let StatusQuery { status, paper_size } = printer.query_status()?;
    println!("{status}");
    match paper_size {
        Ok(size) => println!("Paper size: {} (code {})", size, i32::from(size)),
        // Best-effort read: report the failure without discarding the status.
        Err(err) => eprintln!("npctl: {err}"),
    }
    Ok(())
}

/// Hand a print-ready file to the installed print queue.
fn spool_file(path: &Path) -> Result<()> {
    info!(path = %path.display(), "spooling to lpr");
    let status = Command::new("lpr")
        .arg(path)
        .status()
        .context("failed to run lpr")?;
    if !status.success() {
        bail!("lpr rejected {} ({status})", path.display());
    }
    info!("lpr accepted the job");
    Ok(())
}

const DEMO_PAGE: &str = "\
%!PS-Adobe-2.0
%%Title: npctl demo
/Courier findfont 18 scalefont setfont
72 720 moveto (N2000 Laser Printer Demo Page) show
72 700 moveto (Generated by npctl) show
newpath 100 500 moveto 300 500 lineto 300 700 lineto 100 700 lineto closepath stroke
showpage
";

/// Feed the built-in demo page straight to the print queue.
fn spool_demo() -> Result<()> {
    info!("spooling demo page to lpr");
    let mut child = Command::new("lpr")
        .stdin(Stdio::piped())
        .spawn()
        .context("failed to run lpr")?;
    {
        let mut stdin = child.stdin.take().context("lpr stdin unavailable")?;
        stdin
            .write_all(DEMO_PAGE.as_bytes())
            .context("failed to feed lpr")?;
    }
    let status = child.wait().context("failed to wait for lpr")?;
    if !status.success() {
        bail!("lpr rejected the demo page ({status})");
    }
    info!("lpr accepted the job");
    Ok(())
}
