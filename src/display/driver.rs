//! Display driver collaborators
//!
//! The presentation engine owns exactly one driver and is the only writer,
//! so drivers take `&mut self` and need no locking of their own.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::{Error, Result};

/// Operations the presentation engine needs from a character display
pub trait DisplayDriver: Send + 'static {
    fn write(&mut self, message: &str) -> Result<()>;

    fn clear(&mut self) -> Result<()>;

    fn set_backlight(&mut self, on: bool) -> Result<()>;

    /// Release the device once the engine stops
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Renders the display as time-stamped lines on a writer (stdout in the binary)
pub struct ConsoleDisplay<W: Write + Send + 'static> {
    out: W,
    backlight: bool,
}

impl<W: Write + Send + 'static> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            backlight: true,
        }
    }

    fn line(&mut self, text: &str) -> Result<()> {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        writeln!(self.out, "[{}] {}", stamp, text)
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::Display(e.to_string()))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + 'static> DisplayDriver for ConsoleDisplay<W> {
    fn write(&mut self, message: &str) -> Result<()> {
        let marker = if self.backlight { "|" } else { ":" };
        self.line(&format!("{}{}{}", marker, message, marker))
    }

    fn clear(&mut self) -> Result<()> {
        self.line("<clear>")
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.backlight = on;
        self.line(if on { "<backlight on>" } else { "<backlight off>" })
    }

    fn close(&mut self) -> Result<()> {
        self.line("<closed>")
    }
}

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Write(String),
    Clear,
    Backlight(bool),
    Close,
}

/// Shared view of everything a [`MemoryDisplay`] was asked to do
#[derive(Debug, Clone, Default)]
pub struct DisplayLog {
    ops: Arc<Mutex<Vec<(Instant, DisplayOp)>>>,
}

impl DisplayLog {
    /// Recorded operations in call order
    pub fn ops(&self) -> Vec<DisplayOp> {
        self.ops.lock().iter().map(|(_, op)| op.clone()).collect()
    }

    /// Recorded operations with the instant each was issued
    pub fn timed_ops(&self) -> Vec<(Instant, DisplayOp)> {
        self.ops.lock().clone()
    }

    pub fn count(&self, op: &DisplayOp) -> usize {
        self.ops.lock().iter().filter(|(_, o)| o == op).count()
    }

    pub fn len(&self) -> usize {
        self.ops.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().is_empty()
    }
}

/// In-memory driver for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    log: DisplayLog,
    fail_writes: bool,
}

impl MemoryDisplay {
    pub fn new() -> (Self, DisplayLog) {
        let display = Self::default();
        let log = display.log.clone();
        (display, log)
    }

    /// Driver whose `write` always fails after recording the attempt
    pub fn failing() -> (Self, DisplayLog) {
        let (mut display, log) = Self::new();
        display.fail_writes = true;
        (display, log)
    }

    fn record(&self, op: DisplayOp) {
        self.log.ops.lock().push((Instant::now(), op));
    }
}

impl DisplayDriver for MemoryDisplay {
    fn write(&mut self, message: &str) -> Result<()> {
        self.record(DisplayOp::Write(message.to_string()));
        if self.fail_writes {
            return Err(Error::Display("write rejected".to_string()));
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.record(DisplayOp::Clear);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.record(DisplayOp::Backlight(on));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.record(DisplayOp::Close);
        Ok(())
    }
}
