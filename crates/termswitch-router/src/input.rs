//! Input routing from the physical source to one session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::physical::PhysicalInput;
use crate::{Delivery, RouterStats};

/// Receiver of routed input.
pub trait InputSink {
    /// A chunk of physical input arrived while the session was focused.
    fn on_data(&mut self, chunk: &[u8]);

    /// The physical input ended while the session was focused.
    fn on_end(&mut self);
}

#[derive(Debug)]
struct InputGate {
    label: String,
    active: AtomicBool,
    source: PhysicalInput,
    forwarded: AtomicU64,
    dropped: AtomicU64,
}

/// Gate between the physical input and one session's engine.
///
/// Closed gates drop input for good: nothing is buffered, so a session never
/// sees what was typed while it was unfocused.
#[derive(Debug, Clone)]
pub struct InputRouter {
    gate: Arc<InputGate>,
}

impl InputRouter {
    /// Create an inactive router over the physical input.
    pub fn new(source: PhysicalInput, label: impl Into<String>) -> Self {
        Self {
            gate: Arc::new(InputGate {
                label: label.into(),
                active: AtomicBool::new(false),
                source,
                forwarded: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Open or close the gate. Idempotent.
    pub fn set_active(&self, active: bool) {
        let was = self.gate.active.swap(active, Ordering::SeqCst);
        if was != active {
            debug!(session = %self.gate.label, active, "input gate toggled");
        }
    }

    /// Whether the gate is open.
    pub fn is_active(&self) -> bool {
        self.gate.active.load(Ordering::SeqCst)
    }

    /// Route a physical input chunk to `sink`.
    pub fn on_data<S: InputSink + ?Sized>(&self, chunk: &[u8], sink: &mut S) -> Delivery {
        if self.is_active() {
            self.gate.forwarded.fetch_add(1, Ordering::Relaxed);
            sink.on_data(chunk);
            Delivery::Forwarded
        } else {
            self.gate.dropped.fetch_add(1, Ordering::Relaxed);
            trace!(session = %self.gate.label, bytes = chunk.len(), "input dropped");
            Delivery::Dropped
        }
    }

    /// Route physical end-of-stream to `sink`. Swallowed while inactive.
    pub fn on_end<S: InputSink + ?Sized>(&self, sink: &mut S) -> Delivery {
        if self.is_active() {
            self.gate.forwarded.fetch_add(1, Ordering::Relaxed);
            sink.on_end();
            Delivery::Forwarded
        } else {
            self.gate.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(session = %self.gate.label, "end of input swallowed");
            Delivery::Dropped
        }
    }

    /// Pause the physical input. Only forwarded while the gate is open.
    pub fn pause(&self) -> bool {
        if self.is_active() {
            self.gate.source.pause();
            true
        } else {
            trace!(session = %self.gate.label, "pause ignored while unfocused");
            false
        }
    }

    /// Resume the physical input. Only forwarded while the gate is open.
    pub fn resume(&self) -> bool {
        if self.is_active() {
            self.gate.source.resume();
            true
        } else {
            trace!(session = %self.gate.label, "resume ignored while unfocused");
            false
        }
    }

    /// Chunk counters. End-of-stream counts as one unit.
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            forwarded: self.gate.forwarded.load(Ordering::Relaxed),
            dropped: self.gate.dropped.load(Ordering::Relaxed),
        }
    }

    /// Engine-facing handle sharing this router's gate.
    pub fn handle(&self) -> InputHandle {
        InputHandle {
            router: self.clone(),
        }
    }
}

/// What a session engine holds of its input router: flow control only.
#[derive(Debug, Clone)]
pub struct InputHandle {
    router: InputRouter,
}

impl InputHandle {
    /// Ask the physical input to pause. Returns whether it was forwarded.
    pub fn pause(&self) -> bool {
        self.router.pause()
    }

    /// Ask the physical input to resume. Returns whether it was forwarded.
    pub fn resume(&self) -> bool {
        self.router.resume()
    }

    /// Whether the owning session is focused.
    pub fn is_focused(&self) -> bool {
        self.router.is_active()
    }
}
