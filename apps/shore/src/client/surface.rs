//! Local terminal output. `Surface` is the seam the session writes through so
//! tests can capture display bytes without a real tty.

use std::io::{self, Write};

use crate::session::Geometry;

pub trait Surface {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Measure the host viewport.
    fn fit(&self) -> Geometry;
}

/// Keeps the terminal in raw mode for the lifetime of the guard.
struct RawModeGuard(bool);

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self(true))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.0 {
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }
}

/// Writes straight to stdout with the terminal held in raw mode. Dropping the
/// surface restores the cooked terminal.
pub struct StdoutSurface {
    stdout: io::Stdout,
    _raw: RawModeGuard,
}

impl StdoutSurface {
    pub fn new() -> io::Result<Self> {
        let raw = RawModeGuard::enable()?;
        Ok(Self {
            stdout: io::stdout(),
            _raw: raw,
        })
    }
}

impl Surface for StdoutSurface {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdout.write_all(bytes)?;
        self.stdout.flush()
    }

    fn fit(&self) -> Geometry {
        match crossterm::terminal::size() {
            Ok((cols, rows)) => Geometry { cols, rows },
            Err(_) => Geometry::default(),
        }
    }
}
