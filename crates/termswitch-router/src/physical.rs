//! Handles to the one physical terminal.
//!
//! Both handles are cheap to clone and share the same underlying device.
//! Only the routers in this crate can reach the device through them: the
//! control and write methods are crate-private.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Flow control surface of the physical input source.
pub trait InputControl: Send {
    /// Stop delivering input until [`InputControl::resume`] is called.
    fn pause(&mut self);

    /// Start delivering input again.
    fn resume(&mut self);
}

/// Control surface for sources that cannot be paused.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFlowControl;

impl InputControl for NoFlowControl {
    fn pause(&mut self) {}

    fn resume(&mut self) {}
}

/// Shared handle to the physical input's flow control.
#[derive(Clone)]
pub struct PhysicalInput {
    control: Arc<Mutex<Box<dyn InputControl>>>,
}

impl std::fmt::Debug for PhysicalInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalInput").finish_non_exhaustive()
    }
}

impl PhysicalInput {
    /// Wrap the control surface of the physical input source.
    pub fn new<C: InputControl + 'static>(control: C) -> Self {
        Self {
            control: Arc::new(Mutex::new(Box::new(control))),
        }
    }

    /// Physical input without flow control.
    pub fn detached() -> Self {
        Self::new(NoFlowControl)
    }

    pub(crate) fn pause(&self) {
        self.control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pause();
    }

    pub(crate) fn resume(&self) {
        self.control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resume();
    }
}

/// Shared handle to the physical output sink.
#[derive(Clone)]
pub struct PhysicalOutput {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl std::fmt::Debug for PhysicalOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalOutput").finish_non_exhaustive()
    }
}

impl PhysicalOutput {
    /// Wrap the physical output sink.
    pub fn new<W: Write + Send + 'static>(sink: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Lock the sink. Gate flips happen under this lock so that no write from a
    /// router can land after that router was deactivated.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory sink capturing everything written to it.
///
/// Clones share the same buffer, so one clone can be handed to a
/// [`PhysicalOutput`] while another inspects the captured bytes.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Return and clear the captured bytes.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
