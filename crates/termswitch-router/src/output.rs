//! Output routing from one session to the physical sink.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::physical::PhysicalOutput;
use crate::{Delivery, RouterStats};

#[derive(Debug)]
struct OutputGate {
    label: String,
    active: AtomicBool,
    sink: PhysicalOutput,
    forwarded: AtomicU64,
    dropped: AtomicU64,
}

/// Gate between one session's engine and the physical output.
///
/// Output written while the gate is closed is discarded, not queued.
#[derive(Debug, Clone)]
pub struct OutputRouter {
    gate: Arc<OutputGate>,
}

impl OutputRouter {
    /// Create an inactive router over the physical output.
    pub fn new(sink: PhysicalOutput, label: impl Into<String>) -> Self {
        Self {
            gate: Arc::new(OutputGate {
                label: label.into(),
                active: AtomicBool::new(false),
                sink,
                forwarded: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Open or close the gate. Idempotent.
    ///
    /// Flipped under the sink lock, so no write from this router lands after
    /// it has been deactivated.
    pub fn set_active(&self, active: bool) {
        let _sink = self.gate.sink.lock();
        let was = self.gate.active.swap(active, Ordering::SeqCst);
        if was != active {
            debug!(session = %self.gate.label, active, "output gate toggled");
        }
    }

    /// Whether the gate is open.
    pub fn is_active(&self) -> bool {
        self.gate.active.load(Ordering::SeqCst)
    }

    /// Write `data` to the physical sink if the gate is open.
    pub fn send(&self, data: &[u8]) -> io::Result<Delivery> {
        let mut sink = self.gate.sink.lock();
        if !self.gate.active.load(Ordering::SeqCst) {
            drop(sink);
            self.gate
                .dropped
                .fetch_add(data.len() as u64, Ordering::Relaxed);
            trace!(session = %self.gate.label, bytes = data.len(), "output dropped");
            return Ok(Delivery::Dropped);
        }

        sink.write_all(data)
            .and_then(|()| sink.flush())
            .map_err(|e| {
                warn!(session = %self.gate.label, "physical output write failed: {}", e);
                e
            })?;
        self.gate
            .forwarded
            .fetch_add(data.len() as u64, Ordering::Relaxed);
        Ok(Delivery::Forwarded)
    }

    /// Byte counters.
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            forwarded: self.gate.forwarded.load(Ordering::Relaxed),
            dropped: self.gate.dropped.load(Ordering::Relaxed),
        }
    }

    /// Engine-facing writer sharing this router's gate.
    pub fn handle(&self) -> OutputHandle {
        OutputHandle {
            router: self.clone(),
        }
    }
}

/// What a session engine holds of its output router: a writer.
///
/// Writes always report the full length, including dropped ones, so engines
/// behave the same whether or not they are focused.
#[derive(Debug, Clone)]
pub struct OutputHandle {
    router: OutputRouter,
}

impl OutputHandle {
    /// Whether the owning session is focused.
    pub fn is_focused(&self) -> bool {
        self.router.is_active()
    }
}

impl Write for OutputHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.router.send(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
